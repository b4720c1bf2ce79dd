use crate::gfx::backend::{GfxFactories, GraphicsBackend};
use crate::resource::{GfxResource, ResourceFactory, ResourceState};

/// 空后端
#[derive(Debug, Default)]
pub struct NullBackend;

impl NullBackend {
    pub fn new() -> Self {
        Self
    }
}

impl GraphicsBackend for NullBackend {
    fn backend_name(&self) -> &str {
        "Null"
    }

    fn create_factories(&self) -> GfxFactories {
        GfxFactories {
            mesh: Box::new(NullFactory),
            shader: Box::new(NullFactory),
            texture: Box::new(NullFactory),
            pipeline: Box::new(NullFactory),
            render_pass: Box::new(NullFactory),
        }
    }
}

/// 适用于任何资源种类的空工厂
#[derive(Debug, Default)]
pub struct NullFactory;

impl<R: GfxResource> ResourceFactory<R> for NullFactory {
    fn setup_resource(&mut self, _resource: &mut R, _data: Option<&[u8]>) -> ResourceState {
        ResourceState::Valid
    }

    fn destroy_resource(&mut self, _resource: &mut R) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ResourceConfig;
    use crate::gfx::resources::{Shader, ShaderSetup};
    use crate::resource::{ResourceContainer, ResourceLabel};

    #[test]
    fn test_null_backend_accepts_everything() {
        let backend = NullBackend::new();
        assert_eq!(backend.backend_name(), "Null");
        assert_eq!(backend.memory_in_use(), None);

        let mut container = ResourceContainer::new(&ResourceConfig::default(), backend.create_factories());
        let id = container.create::<Shader>(ShaderSetup::new("any", "", ""), None);
        assert_eq!(container.query_state(id), ResourceState::Valid);

        container.destroy(ResourceLabel::ALL);
        assert!(!container.contains(id));
    }
}
