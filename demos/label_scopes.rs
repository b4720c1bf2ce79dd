//! 标签作用域演示
//!
//! 演示嵌套标签作用域、按标签即时销毁、延迟销毁和垃圾回收。
//!
//! # 运行方式
//!
//! ```bash
//! cargo run --example label_scopes
//! ```

use dist_resource::core::config::ResourceConfig;
use dist_resource::gfx::resources::{IndexType, Mesh, MeshSetup, PixelFormat, Texture, TextureSetup, Vertex};
use dist_resource::gfx::{GraphicsBackend, NullBackend};
use dist_resource::resource::{Locator, ResourceContainer, ResourceKind, ResourceLabel};

fn mesh(name: &str) -> MeshSetup {
    MeshSetup::from_data(name, Vertex::layout(), 3, 0, IndexType::None)
}

fn main() {
    println!("=== DistResource 标签作用域演示 ===\n");

    let mut config = ResourceConfig::default();
    config.set_all_pool_sizes(8);
    let mut container = ResourceContainer::new(&config, NullBackend::new().create_factories());
    let triangle = [0u8; 96];

    // === 1. 嵌套作用域 ===
    println!("--- 1. 嵌套作用域 ---");
    let level = container.push_label();
    let terrain = container.create::<Mesh>(mesh("terrain"), Some(&triangle));

    let (props, rock) = {
        let mut scope = container.label_scope();
        let rock = scope.create::<Mesh>(mesh("rock"), Some(&triangle));
        scope.create::<Texture>(
            TextureSetup::from_pixel_data("rock_albedo", 1, 1, PixelFormat::RGBA8),
            Some(&[128, 128, 128, 255]),
        );
        (scope.label(), rock)
    };
    container.pop_label();

    println!("关卡标签 {}: terrain = {}", level, terrain);
    println!("道具标签 {}: rock = {}", props, rock);
    println!("栈顶标签: {}\n", container.peek_label());

    // === 2. 重复创建返回同一句柄 ===
    println!("--- 2. 定位符去重 ---");
    let again = container.create::<Mesh>(mesh("rock"), Some(&triangle));
    println!("再次创建 rock: {} (相同: {})\n", again, again == rock);

    // === 3. 只销毁内层作用域 ===
    println!("--- 3. 销毁道具标签 ---");
    container.destroy(props);
    println!("rock 状态: {}", container.query_state(rock));
    println!("terrain 状态: {}\n", container.query_state(terrain));

    // === 4. 延迟销毁外层作用域 ===
    println!("--- 4. 延迟销毁关卡标签 ---");
    container.destroy_deferred(level);
    println!(
        "terrain 可查找: {}，队列长度: {}，状态: {}",
        container.lookup(&Locator::new("terrain")).is_valid(),
        container.num_queued_destroys(),
        container.query_state(terrain)
    );

    container.update();
    container.garbage_collect();
    println!("垃圾回收后 terrain 状态: {}\n", container.query_state(terrain));

    // === 5. 资源池统计 ===
    println!("--- 5. 资源池统计 ---");
    container.create::<Mesh>(mesh("leftover"), Some(&triangle));
    for kind in [ResourceKind::Mesh, ResourceKind::Texture] {
        let info = container.query_pool_info(kind);
        println!(
            "{}: {}/{} 已使用, {} 有效",
            kind, info.num_used_slots, info.num_slots, info.num_valid
        );
    }

    container.destroy(ResourceLabel::ALL);
    container.discard();
    println!("\n=== 演示完成 ===");
}
