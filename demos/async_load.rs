//! 异步加载演示
//!
//! 演示 `ChannelLoader` 和 `ThreadedLoader`：后台线程交付数据，
//! 主线程每帧调用 `update()` 推进加载器；以及加载过程中销毁资源的竞态。
//!
//! # 运行方式
//!
//! ```bash
//! cargo run --example async_load
//! ```

use std::thread;
use std::time::Duration;

use dist_resource::core::config::{LogLevel, ResourceConfig};
use dist_resource::core::log;
use dist_resource::gfx::resources::{PixelFormat, Texture, TextureSetup};
use dist_resource::gfx::{GraphicsBackend, HeadlessBackend};
use dist_resource::resource::{ChannelLoader, ResourceContainer, ThreadedLoader};

fn main() {
    log::init_logger(LogLevel::Debug, false, None);
    println!("=== DistResource 异步加载演示 ===\n");

    let backend = HeadlessBackend::new(1 << 20);
    let mut container = ResourceContainer::new(&ResourceConfig::default(), backend.create_factories());

    // === 1. 后台线程通过通道交付 ===
    println!("--- 1. ChannelLoader ---");
    let (loader, sender) = ChannelLoader::<Texture>::new(TextureSetup::from_pixel_data(
        "streamed",
        16,
        16,
        PixelFormat::RGBA8,
    ));
    let streamed = container.load(Box::new(loader));
    let producer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        sender.complete(vec![200u8; 16 * 16 * 4])
    });

    // === 2. 独立线程运行的加载任务 ===
    println!("--- 2. ThreadedLoader ---");
    let generated = container.load(Box::new(ThreadedLoader::<Texture>::new(
        TextureSetup::from_pixel_data("generated", 8, 8, PixelFormat::R8),
        |sender| {
            let pixels: Vec<u8> = (0..64u8).map(|i| i * 4).collect();
            let _ = sender.complete(pixels);
        },
    )));

    // === 3. 加载中销毁 ===
    println!("--- 3. 加载中销毁 ---");
    let label = container.push_label();
    let (loader, late_sender) = ChannelLoader::<Texture>::new(TextureSetup::from_pixel_data(
        "late",
        4,
        4,
        PixelFormat::RGBA8,
    ));
    let late = container.load(Box::new(loader));
    container.pop_label();
    container.destroy(label);
    println!("late 交付结果: {:?}", late_sender.complete(vec![0u8; 64]));

    let mut frame = 0;
    while container.num_pending_loaders() > 0 {
        container.update();
        frame += 1;
        thread::sleep(Duration::from_millis(5));
    }
    let _ = producer.join();

    println!("{} 帧后全部完成", frame);
    for (name, id) in [("streamed", streamed), ("generated", generated), ("late", late)] {
        println!("{}: {}", name, container.query_state(id));
    }
    println!("设备内存占用: {:?} 字节", backend.memory_in_use());

    container.discard();
    println!("\n=== 演示完成 ===");
}
