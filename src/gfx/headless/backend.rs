use std::cell::RefCell;
use std::rc::Rc;

use super::memory::DeviceMemory;
use crate::core::config::GraphicsConfig;
use crate::core::error::GraphicsError;
use crate::gfx::backend::{GfxFactories, GraphicsBackend};
use crate::gfx::resources::{
    GpuObject, Mesh, MeshSetup, Pipeline, PipelineSetup, RenderPass, RenderPassSetup, Shader,
    ShaderSetup, Texture, TextureSetup, TextureUsage, Usage,
};
use crate::resource::{GfxResource, Locator, ResourceFactory, ResourceKind, ResourceSetup, ResourceState};
use crate::{resource_debug, resource_warn};

/// 管线状态对象占用的设备内存
const PIPELINE_OBJECT_SIZE: u64 = 256;

/// 无头后端
pub struct HeadlessBackend {
    memory: Rc<RefCell<DeviceMemory>>,
}

impl HeadlessBackend {
    /// 以字节为单位的预算创建后端
    pub fn new(budget: u64) -> Self {
        Self {
            memory: Rc::new(RefCell::new(DeviceMemory::new(budget))),
        }
    }

    /// 按配置创建后端
    pub fn from_config(config: &GraphicsConfig) -> Self {
        Self::new(config.memory_budget_mb.saturating_mul(1024 * 1024))
    }

    /// 共享的设备内存
    pub fn memory(&self) -> Rc<RefCell<DeviceMemory>> {
        self.memory.clone()
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn backend_name(&self) -> &str {
        "Headless"
    }

    fn create_factories(&self) -> GfxFactories {
        let factory = || Box::new(HeadlessFactory { memory: self.memory.clone() });
        GfxFactories {
            mesh: factory(),
            shader: factory(),
            texture: factory(),
            pipeline: factory(),
            render_pass: factory(),
        }
    }

    fn memory_in_use(&self) -> Option<u64> {
        Some(self.memory.borrow().used())
    }
}

/// 无头后端的工厂
///
/// 所有种类共用同一个实现，共享同一块设备内存。
pub struct HeadlessFactory {
    memory: Rc<RefCell<DeviceMemory>>,
}

impl HeadlessFactory {
    /// 分配设备内存，失败时记录警告
    fn allocate(&self, kind: ResourceKind, locator: &Locator, size: Result<u64, GraphicsError>) -> Option<GpuObject> {
        match size.and_then(|size| self.memory.borrow_mut().allocate(kind, size)) {
            Ok(object) => {
                resource_debug!(kind = %kind, locator = %locator, raw = object.raw, size = object.size, "Backend object created");
                Some(object)
            }
            Err(e) => {
                resource_warn!(kind = %kind, locator = %locator, "{}", e);
                None
            }
        }
    }

    fn release(&self, object: Option<GpuObject>) {
        if let Some(object) = object {
            if !self.memory.borrow_mut().free(object) {
                resource_warn!(raw = object.raw, "Backend object released twice");
            }
        }
    }

    fn report_leaks(&self, kind: ResourceKind) {
        let live = self.memory.borrow().num_live(kind);
        if live > 0 {
            resource_warn!(kind = %kind, live, "Backend objects still alive at discard");
        }
    }
}

/// 把分配结果写回资源
macro_rules! settle {
    ($factory:expr, $ty:ty, $resource:expr, $size:expr) => {{
        let object = $factory.allocate(
            <$ty as GfxResource>::KIND,
            $resource.setup().locator(),
            $size,
        );
        match object {
            Some(object) => {
                $resource.attach(object);
                ResourceState::Valid
            }
            None => ResourceState::Failed,
        }
    }};
}

fn mesh_size(setup: &MeshSetup, data: Option<&[u8]>) -> Result<u64, GraphicsError> {
    if setup.num_vertices > 0 && setup.layout.is_empty() {
        return Err(GraphicsError::InvalidSetup("mesh has vertices but no vertex layout".to_string()));
    }
    let expected = setup
        .data_size()
        .ok_or_else(|| GraphicsError::InvalidSetup("mesh data size overflows".to_string()))?;
    match (setup.usage, data) {
        (Usage::Immutable, None) => Err(GraphicsError::InvalidSetup(
            "immutable mesh requires initial data".to_string(),
        )),
        (_, Some(data)) if data.len() < expected => Err(GraphicsError::InvalidSetup(format!(
            "mesh data is {} bytes, expected {}",
            data.len(),
            expected
        ))),
        _ => Ok(expected as u64),
    }
}

fn shader_size(setup: &ShaderSetup) -> Result<u64, GraphicsError> {
    if setup.vertex_source.trim().is_empty() || setup.fragment_source.trim().is_empty() {
        return Err(GraphicsError::ShaderCompilation("empty shader source".to_string()));
    }
    for source in [&setup.vertex_source, &setup.fragment_source] {
        if !source.contains(setup.entry_point.as_str()) {
            return Err(GraphicsError::ShaderCompilation(format!(
                "entry point '{}' not found",
                setup.entry_point
            )));
        }
    }
    Ok((setup.vertex_source.len() + setup.fragment_source.len()) as u64)
}

fn texture_size(setup: &TextureSetup, data: Option<&[u8]>) -> Result<u64, GraphicsError> {
    if setup.width == 0 || setup.height == 0 {
        return Err(GraphicsError::InvalidSetup("texture dimensions must be non-zero".to_string()));
    }
    let max_mips = 32 - setup.width.max(setup.height).leading_zeros();
    if setup.num_mipmaps == 0 || setup.num_mipmaps > max_mips {
        return Err(GraphicsError::InvalidSetup(format!(
            "texture has {} mipmaps, at most {} allowed",
            setup.num_mipmaps, max_mips
        )));
    }
    let expected = setup
        .byte_size()
        .ok_or_else(|| GraphicsError::InvalidSetup("texture size overflows".to_string()))?;
    match (setup.usage, data) {
        (TextureUsage::Immutable, None) => Err(GraphicsError::InvalidSetup(
            "immutable texture requires pixel data".to_string(),
        )),
        (TextureUsage::Immutable, Some(data)) if data.len() < expected => Err(GraphicsError::InvalidSetup(format!(
            "texture data is {} bytes, expected {}",
            data.len(),
            expected
        ))),
        (TextureUsage::RenderTarget, Some(_)) => Err(GraphicsError::InvalidSetup(
            "render target cannot take initial data".to_string(),
        )),
        _ => Ok(expected as u64),
    }
}

fn pipeline_size(setup: &PipelineSetup) -> Result<u64, GraphicsError> {
    if !setup.shader.is_valid() || setup.shader.kind != ResourceKind::Shader {
        return Err(GraphicsError::InvalidSetup(format!("pipeline shader {} is not a shader", setup.shader)));
    }
    if setup.layout.is_empty() {
        return Err(GraphicsError::InvalidSetup("pipeline has no vertex layout".to_string()));
    }
    Ok(PIPELINE_OBJECT_SIZE)
}

fn render_pass_size(setup: &RenderPassSetup) -> Result<u64, GraphicsError> {
    if setup.color_attachments.is_empty() && setup.depth_attachment.is_none() {
        return Err(GraphicsError::InvalidSetup("render pass has no attachments".to_string()));
    }
    let attachments = setup.color_attachments.iter().chain(setup.depth_attachment.iter());
    for id in attachments {
        if !id.is_valid() || id.kind != ResourceKind::Texture {
            return Err(GraphicsError::InvalidSetup(format!("attachment {} is not a texture", id)));
        }
    }
    Ok(0)
}

impl ResourceFactory<Mesh> for HeadlessFactory {
    fn setup_resource(&mut self, mesh: &mut Mesh, data: Option<&[u8]>) -> ResourceState {
        settle!(self, Mesh, mesh, mesh_size(mesh.setup(), data))
    }

    fn destroy_resource(&mut self, mesh: &mut Mesh) {
        self.release(mesh.detach());
    }

    fn discard(&mut self) {
        self.report_leaks(ResourceKind::Mesh);
    }
}

impl ResourceFactory<Shader> for HeadlessFactory {
    fn setup_resource(&mut self, shader: &mut Shader, _data: Option<&[u8]>) -> ResourceState {
        settle!(self, Shader, shader, shader_size(shader.setup()))
    }

    fn destroy_resource(&mut self, shader: &mut Shader) {
        self.release(shader.detach());
    }

    fn discard(&mut self) {
        self.report_leaks(ResourceKind::Shader);
    }
}

impl ResourceFactory<Texture> for HeadlessFactory {
    fn setup_resource(&mut self, texture: &mut Texture, data: Option<&[u8]>) -> ResourceState {
        settle!(self, Texture, texture, texture_size(texture.setup(), data))
    }

    fn destroy_resource(&mut self, texture: &mut Texture) {
        self.release(texture.detach());
    }

    fn discard(&mut self) {
        self.report_leaks(ResourceKind::Texture);
    }
}

impl ResourceFactory<Pipeline> for HeadlessFactory {
    fn setup_resource(&mut self, pipeline: &mut Pipeline, _data: Option<&[u8]>) -> ResourceState {
        settle!(self, Pipeline, pipeline, pipeline_size(pipeline.setup()))
    }

    fn destroy_resource(&mut self, pipeline: &mut Pipeline) {
        self.release(pipeline.detach());
    }

    fn discard(&mut self) {
        self.report_leaks(ResourceKind::Pipeline);
    }
}

impl ResourceFactory<RenderPass> for HeadlessFactory {
    fn setup_resource(&mut self, pass: &mut RenderPass, _data: Option<&[u8]>) -> ResourceState {
        settle!(self, RenderPass, pass, render_pass_size(pass.setup()))
    }

    fn destroy_resource(&mut self, pass: &mut RenderPass) {
        self.release(pass.detach());
    }

    fn discard(&mut self) {
        self.report_leaks(ResourceKind::RenderPass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ResourceConfig;
    use crate::gfx::resources::{IndexType, PixelFormat, Vertex};
    use crate::resource::{ResourceContainer, ResourceLabel};

    const VS: &str = "void main() { gl_Position = vec4(0.0); }";
    const FS: &str = "void main() { frag = vec4(1.0); }";

    fn setup(budget: u64) -> (HeadlessBackend, ResourceContainer) {
        let backend = HeadlessBackend::new(budget);
        let mut config = ResourceConfig::default();
        config.set_all_pool_sizes(8);
        let container = ResourceContainer::new(&config, backend.create_factories());
        (backend, container)
    }

    #[test]
    fn test_mesh_memory_is_tracked() {
        let (backend, mut container) = setup(4096);
        let mesh_setup = MeshSetup::from_data("tri", Vertex::layout(), 3, 3, IndexType::U16);
        let data = vec![0u8; mesh_setup.data_size().unwrap()];

        let id = container.create::<Mesh>(mesh_setup, Some(&data));
        assert_eq!(container.query_state(id), ResourceState::Valid);
        assert_eq!(backend.memory_in_use(), Some(3 * 32 + 6));
        assert!(container.get::<Mesh>(id).and_then(|m| m.gpu()).is_some());

        container.destroy(ResourceLabel::ALL);
        assert_eq!(backend.memory_in_use(), Some(0));
    }

    #[test]
    fn test_invalid_setups_fail() {
        let (backend, mut container) = setup(4096);

        let short = container.create::<Mesh>(
            MeshSetup::from_data("short", Vertex::layout(), 3, 0, IndexType::None),
            Some(&[0u8; 4]),
        );
        let bad_shader = container.create::<Shader>(ShaderSetup::new("bad", VS, "void frag() {}"), None);
        let too_many_mips = container.create::<Texture>(
            TextureSetup::from_pixel_data("mips", 4, 4, PixelFormat::RGBA8).with_mipmaps(4),
            Some(&[0u8; 4096]),
        );
        let orphan_pass = container.create::<RenderPass>(RenderPassSetup::new("empty", Vec::new()), None);

        for id in [short, bad_shader, too_many_mips, orphan_pass] {
            assert_eq!(container.query_state(id), ResourceState::Failed);
        }
        assert_eq!(backend.memory().borrow().num_live_total(), 0);
    }

    #[test]
    fn test_oversized_setups_fail_instead_of_panicking() {
        let (backend, mut container) = setup(1 << 20);
        let texture = container.create::<Texture>(
            TextureSetup::render_target("huge", u32::MAX, u32::MAX, PixelFormat::RGBA32F),
            None,
        );
        let mesh = container.create::<Mesh>(
            MeshSetup::dynamic("huge", Vertex::layout(), usize::MAX / 2, Usage::Stream),
            None,
        );

        assert_eq!(container.query_state(texture), ResourceState::Failed);
        assert_eq!(container.query_state(mesh), ResourceState::Failed);
        assert_eq!(backend.memory().borrow().num_live_total(), 0);
    }

    #[test]
    fn test_dynamic_mesh_without_data() {
        let (backend, mut container) = setup(4096);
        let id = container.create::<Mesh>(MeshSetup::dynamic("particles", Vertex::layout(), 16, Usage::Dynamic), None);
        assert_eq!(container.query_state(id), ResourceState::Valid);
        assert_eq!(backend.memory_in_use(), Some(16 * 32));
    }

    #[test]
    fn test_out_of_memory_fails_resource() {
        let (_backend, mut container) = setup(64);
        let id = container.create::<Texture>(
            TextureSetup::from_pixel_data("big", 8, 8, PixelFormat::RGBA8),
            Some(&[0u8; 256]),
        );
        assert_eq!(container.query_state(id), ResourceState::Failed);
    }

    #[test]
    fn test_pipeline_and_pass_creation() {
        let (backend, mut container) = setup(1 << 20);
        let shader = container.create::<Shader>(ShaderSetup::new("basic", VS, FS), None);
        let pipeline = container.create::<Pipeline>(PipelineSetup::new("basic_pipeline", shader, Vertex::layout()), None);
        let color = container.create::<Texture>(
            TextureSetup::render_target("color", 64, 64, PixelFormat::RGBA8),
            None,
        );
        let depth = container.create::<Texture>(
            TextureSetup::render_target("depth", 64, 64, PixelFormat::Depth),
            None,
        );
        let pass = container.create::<RenderPass>(RenderPassSetup::new("main", vec![color]).with_depth(depth), None);

        for id in [shader, pipeline, color, depth, pass] {
            assert_eq!(container.query_state(id), ResourceState::Valid);
        }
        assert_eq!(backend.memory().borrow().num_live_total(), 5);

        container.discard();
        assert_eq!(backend.memory_in_use(), Some(0));
    }

    #[test]
    fn test_from_config_uses_budget() {
        let backend = HeadlessBackend::from_config(&GraphicsConfig::default());
        assert_eq!(backend.memory().borrow().budget(), 256 * 1024 * 1024);
        assert_eq!(backend.backend_name(), "Headless");

        let config = GraphicsConfig { memory_budget_mb: u64::MAX, ..GraphicsConfig::default() };
        assert_eq!(HeadlessBackend::from_config(&config).memory().borrow().budget(), u64::MAX);
    }
}
