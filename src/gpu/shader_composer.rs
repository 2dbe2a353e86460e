use std::borrow::Cow;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor,
    ShaderLanguage, ShaderType,
};

use crate::error::HaloError;

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Pre-loads the shared WGSL modules at construction time. Consuming
/// shaders use `#import halo::module_name::{item}` to pull in shared code.
/// The composer produces `naga::Module` IR directly, skipping WGSL
/// re-parse at runtime.
pub struct ShaderComposer {
    composer: Composer,
}

/// Shared module definition.
struct ModuleDef {
    source: &'static str,
    file_path: &'static str,
}

/// Shared modules in dependency order.
const MODULES: &[ModuleDef] = &[
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/fullscreen.wgsl"),
        file_path: "modules/fullscreen.wgsl",
    },
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/color.wgsl"),
        file_path: "modules/color.wgsl",
    },
];

impl ShaderComposer {
    /// Composer with every shared module registered.
    ///
    /// # Errors
    ///
    /// Returns [`HaloError::Shader`] if a shared module fails to parse.
    pub fn new() -> Result<Self, HaloError> {
        let mut composer = Composer::default();
        for m in MODULES {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source: m.source,
                    file_path: m.file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| {
                    HaloError::Shader(format!(
                        "registering '{}': {e}",
                        m.file_path
                    ))
                })?;
        }
        Ok(Self { composer })
    }

    /// Compose a shader source string (which may contain `#import`
    /// directives) into a `wgpu::ShaderModule` ready for pipeline creation.
    ///
    /// # Errors
    ///
    /// Returns [`HaloError::Shader`] if composition fails.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        source: &str,
        file_path: &str,
    ) -> Result<wgpu::ShaderModule, HaloError> {
        let module = self.compose_naga(source, file_path).map_err(|e| {
            HaloError::Shader(format!("composing '{file_path}': {e}"))
        })?;
        Ok(create_module(device, label, module))
    }

    /// Compose a shader source into a `naga::Module` without creating a
    /// wgpu shader module. Useful for validation and for testing without a
    /// GPU device.
    ///
    /// # Errors
    ///
    /// Returns the composer error unchanged.
    pub fn compose_naga(
        &mut self,
        source: &str,
        file_path: &str,
    ) -> Result<naga::Module, Box<naga_oil::compose::ComposerError>> {
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source,
                file_path,
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(Box::new)
    }
}

/// Wrap already-built naga IR in a wgpu shader module.
pub fn create_module(
    device: &wgpu::Device,
    label: &str,
    module: naga::Module,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Naga(Cow::Owned(module)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every built-in shader as `(source, file_path)`.
    fn all_shader_sources() -> Vec<(&'static str, &'static str)> {
        vec![
            (
                include_str!("../../assets/shaders/raster/mesh.wgsl"),
                "mesh.wgsl",
            ),
            (
                include_str!("../../assets/shaders/screen/bloom_threshold.wgsl"),
                "bloom_threshold.wgsl",
            ),
            (
                include_str!("../../assets/shaders/screen/bloom_blur.wgsl"),
                "bloom_blur.wgsl",
            ),
            (
                include_str!("../../assets/shaders/screen/bloom_composite.wgsl"),
                "bloom_composite.wgsl",
            ),
            (
                include_str!("../../assets/shaders/screen/output.wgsl"),
                "output.wgsl",
            ),
            (
                include_str!("../../assets/shaders/blend/blend_vertex.wgsl"),
                "blend_vertex.wgsl",
            ),
            (
                include_str!("../../assets/shaders/blend/blend_fragment.wgsl"),
                "blend_fragment.wgsl",
            ),
        ]
    }

    #[test]
    fn all_shaders_compose() {
        let mut composer = ShaderComposer::new().unwrap();
        for (source, file_path) in all_shader_sources() {
            let module = composer
                .compose_naga(source, file_path)
                .unwrap_or_else(|e| {
                    panic!("Shader '{file_path}' failed to compose: {e}")
                });
            assert!(!module.entry_points.is_empty(), "{file_path}");
        }
    }

    #[test]
    fn broken_import_is_reported() {
        let mut composer = ShaderComposer::new().unwrap();
        let source = "#import halo::missing::{nothing}\n\
                      @fragment fn fs_main() -> @location(0) vec4<f32> {\n\
                          return nothing();\n\
                      }";
        assert!(composer.compose_naga(source, "broken.wgsl").is_err());
    }
}
