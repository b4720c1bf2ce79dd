//! DistResource - 无头资源驱动程序
//!
//! 在不打开窗口的情况下运行资源容器的完整生命周期：
//! 创建场景资源、通过后台线程加载纹理、逐帧推进加载器，最后延迟销毁并回收。
//!
//! # 使用方法
//!
//! ```bash
//! # 使用配置文件
//! cargo run
//!
//! # 使用空后端、缩小资源池（命令行覆盖）
//! cargo run -- --null --pool-size 32
//! ```
//!
//! # 每帧流程
//!
//! ```text
//! ┌──────────────────────┐
//! │ container.update()   │  资源池/工厂维护，推进加载器
//! └──────────┬───────────┘
//!            │
//! ┌──────────▼───────────┐
//! │ garbage_collect()    │  释放上一帧延迟销毁的资源
//! └──────────────────────┘
//! ```

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use dist_resource::core::{error::LoadError, log, Config};
use dist_resource::gfx::{
    self,
    resources::{
        IndexType, Mesh, MeshSetup, Pipeline, PipelineSetup, PixelFormat, RenderPass,
        RenderPassSetup, Shader, ShaderSetup, Texture, TextureSetup, Vertex,
    },
};
use dist_resource::resource::{
    Id, Locator, ResourceContainer, ResourceKind, ResourceLabel, ResourceState, ThreadedLoader,
};
use dist_resource::{app_info, app_warn};

/// 最多运行的帧数
const MAX_FRAMES: u32 = 600;

/// 每帧间隔
const FRAME_TIME: Duration = Duration::from_millis(16);

const VERTEX_SHADER: &str = "layout(location = 0) in vec3 position;\nvoid main() { gl_Position = vec4(position, 1.0); }";
const FRAGMENT_SHADER: &str = "out vec4 color;\nvoid main() { color = vec4(1.0); }";

fn main() -> Result<()> {
    // 1. 加载配置并应用命令行参数
    let mut config = Config::from_file_or_default("config.toml");
    config.apply_args(std::env::args());
    config.validate().context("Invalid configuration")?;

    // 2. 初始化日志系统
    let log_file = config
        .logging
        .file_output
        .then_some(config.logging.log_file.as_str());
    log::init_logger(config.logging.level, config.logging.file_output, log_file);
    app_info!(version = env!("CARGO_PKG_VERSION"), "DistResource starting");

    // 3. 创建后端和资源容器
    let backend = gfx::create_backend(&config.graphics);
    app_info!(backend = backend.backend_name(), "Graphics backend created");
    let mut container = ResourceContainer::new(&config.resources, backend.create_factories());

    // 4. 创建场景资源
    let scene = load_scene(&mut container);

    // 5. 逐帧推进，直到所有加载器完成
    let mut frame = 0;
    while container.num_pending_loaders() > 0 && frame < MAX_FRAMES {
        container.update();
        container.garbage_collect();
        frame += 1;
        thread::sleep(FRAME_TIME);
    }
    if container.num_pending_loaders() > 0 {
        app_warn!(frames = frame, pending = container.num_pending_loaders(), "Loaders still pending");
    } else {
        app_info!(frames = frame, "All loaders finished");
    }

    for id in [scene.cube, scene.checker, scene.missing] {
        let info = container.query_resource_info(id);
        app_info!(id = %info.id, locator = %info.locator, state = %info.state, "Resource");
    }
    report_pools(&container, backend.memory_in_use());

    // 6. 延迟销毁场景，下一帧回收
    container.destroy_deferred(scene.label);
    app_info!(queued = container.num_queued_destroys(), "Scene queued for destruction");
    container.update();
    container.garbage_collect();
    debug_assert_eq!(container.query_state(scene.cube), ResourceState::InvalidState);
    report_pools(&container, backend.memory_in_use());

    container.discard();
    app_info!("DistResource finished");
    Ok(())
}

/// 场景中创建的资源
struct Scene {
    label: ResourceLabel,
    cube: Id,
    checker: Id,
    missing: Id,
}

/// 在一个标签作用域内创建场景资源
fn load_scene(container: &mut ResourceContainer) -> Scene {
    let mut scope = container.label_scope();

    let (cube_setup, cube_data) = cube_mesh();
    let cube = scope.create::<Mesh>(cube_setup, Some(&cube_data));

    let shader = scope.create::<Shader>(ShaderSetup::new("basic", VERTEX_SHADER, FRAGMENT_SHADER), None);
    scope.create::<Pipeline>(
        PipelineSetup::new("basic_pipeline", shader, Vertex::layout()),
        None,
    );

    let color = scope.create::<Texture>(
        TextureSetup::render_target("offscreen_color", 256, 256, PixelFormat::RGBA8),
        None,
    );
    let depth = scope.create::<Texture>(
        TextureSetup::render_target("offscreen_depth", 256, 256, PixelFormat::Depth),
        None,
    );
    scope.create::<RenderPass>(RenderPassSetup::new("offscreen", vec![color]).with_depth(depth), None);

    // 后台线程生成棋盘格纹理
    let checker = scope.load(Box::new(ThreadedLoader::<Texture>::new(
        TextureSetup::from_pixel_data("checker", 64, 64, PixelFormat::RGBA8),
        |sender| {
            thread::sleep(Duration::from_millis(50));
            if let Err(e) = sender.complete(checkerboard(64, 8)) {
                app_warn!("Checker texture not delivered: {}", e);
            }
        },
    )));

    // 从磁盘读取一个不存在的纹理，加载失败后资源处于 Failed 状态
    let missing_path = "assets/missing.png";
    let missing = scope.load(Box::new(ThreadedLoader::<Texture>::new(
        TextureSetup::from_pixel_data(Locator::new(missing_path), 1, 1, PixelFormat::RGBA8),
        move |sender| {
            let delivered = match std::fs::read(missing_path) {
                Ok(bytes) => sender.complete(bytes),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    sender.fail(LoadError::SourceNotFound(missing_path.to_string()))
                }
                Err(e) => sender.fail(LoadError::ReadFailed(format!("{}: {}", missing_path, e))),
            };
            if let Err(e) = delivered {
                app_warn!(path = missing_path, "Load result not delivered: {}", e);
            }
        },
    )));

    app_info!(label = %scope.label(), resources = scope.num_registered(), "Scene resources requested");

    Scene {
        label: scope.label(),
        cube,
        checker,
        missing,
    }
}

/// 单位立方体：8 个顶点，36 个 u16 索引
fn cube_mesh() -> (MeshSetup, Vec<u8>) {
    let mut vertices = Vec::with_capacity(8);
    for i in 0..8u32 {
        let x = if i & 1 == 0 { -0.5f32 } else { 0.5 };
        let y = if i & 2 == 0 { -0.5f32 } else { 0.5 };
        let z = if i & 4 == 0 { -0.5f32 } else { 0.5 };
        let len = (x * x + y * y + z * z).sqrt();
        vertices.push(Vertex::new([x, y, z], [x / len, y / len, z / len], [(i & 1) as f32, ((i >> 1) & 1) as f32]));
    }
    let indices: [u16; 36] = [
        0, 2, 1, 1, 2, 3, // -z
        4, 5, 6, 5, 7, 6, // +z
        0, 1, 4, 1, 5, 4, // -y
        2, 6, 3, 3, 6, 7, // +y
        0, 4, 2, 2, 4, 6, // -x
        1, 3, 5, 3, 7, 5, // +x
    ];

    let mut data = Vec::with_capacity(vertices.len() * std::mem::size_of::<Vertex>() + indices.len() * 2);
    data.extend_from_slice(bytemuck::cast_slice(&vertices));
    data.extend_from_slice(bytemuck::cast_slice(&indices));

    let setup = MeshSetup::from_data("cube", Vertex::layout(), vertices.len(), indices.len(), IndexType::U16);
    (setup, data)
}

/// RGBA8 棋盘格像素
fn checkerboard(size: usize, cell: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(size * size * 4);
    for y in 0..size {
        for x in 0..size {
            let value = if (x / cell + y / cell) % 2 == 0 { 255 } else { 32 };
            pixels.extend_from_slice(&[value, value, value, 255]);
        }
    }
    pixels
}

fn report_pools(container: &ResourceContainer, memory_in_use: Option<u64>) {
    for kind in ResourceKind::ALL {
        let info = container.query_pool_info(kind);
        app_info!(
            kind = %kind,
            used = info.num_used_slots,
            free = info.num_free_slots,
            valid = info.num_valid,
            pending = info.num_pending,
            failed = info.num_failed,
            "Pool"
        );
    }
    if let Some(bytes) = memory_in_use {
        app_info!(bytes, "Device memory in use");
    }
}
