//! Opaque scene objects and the assets a scene is built from

use crate::core::config::GroundSettings;
use crate::foundation::math::{Mat4, Mat4Ext, Vec2, Vec3};
use crate::render::api::{BackendResult, EffectKind, RenderBackend, ShaderParam, Technique, TextureBinding, TextureHandle, TextureSlot};
use crate::render::lighting::LightMeshes;
use crate::render::pipeline::OpaqueGeometry;
use crate::render::primitives::mesh::{Mesh, Model, SubMesh};

/// Phong material written into the G-buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMaterial {
    /// Ambient coefficient
    pub ambient: f32,
    /// Diffuse coefficient, stored in the colour target's alpha
    pub diffuse: f32,
    /// Specular coefficient, stored in the normal target's alpha
    pub specular: f32,
    /// Specular exponent, stored in the position target's alpha
    pub shininess: f32,
    /// Texture coordinate scale
    pub tiling: Vec2,
    /// Albedo texture
    pub texture: TextureHandle,
}

impl SurfaceMaterial {
    /// Material described by the ground settings
    pub fn from_settings(settings: &GroundSettings, texture: TextureHandle) -> Self {
        Self {
            ambient: settings.ambient,
            diffuse: settings.diffuse,
            specular: settings.specular,
            shininess: settings.shininess,
            tiling: settings.tiling,
            texture,
        }
    }

    fn bind(&self, backend: &mut dyn RenderBackend) -> BackendResult<()> {
        backend.set_parameter(
            EffectKind::Basic,
            ShaderParam::Texture(TextureSlot::Diffuse, TextureBinding::Texture(self.texture)),
        )?;
        backend.set_parameter(
            EffectKind::Basic,
            ShaderParam::Material {
                ambient: self.ambient,
                diffuse: self.diffuse,
                specular: self.specular,
                shininess: self.shininess,
            },
        )?;
        backend.set_parameter(EffectKind::Basic, ShaderParam::Tiling(self.tiling))
    }
}

/// Textured, lit model drawn into the G-buffer
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueObject {
    /// Geometry
    pub model: Model,
    /// Object-to-world transform
    pub world: Mat4,
    /// Surface parameters
    pub material: SurfaceMaterial,
}

impl OpaqueObject {
    /// Create an object
    pub fn new(model: Model, world: Mat4, material: SurfaceMaterial) -> Self {
        Self { model, world, material }
    }
}

impl OpaqueGeometry for OpaqueObject {
    fn draw_opaque(&self, backend: &mut dyn RenderBackend) -> BackendResult<()> {
        backend.set_technique(EffectKind::Basic, Technique::ColorTextureLit)?;
        self.material.bind(backend)?;
        for part in &self.model.parts {
            let world = self.world * part.parent_transform;
            backend.set_world(EffectKind::Basic, world)?;
            backend.set_parameter(EffectKind::Basic, ShaderParam::InverseTransposeWorld(world.inverse_transpose()))?;
            backend.draw_mesh(part.mesh)?;
        }
        Ok(())
    }
}

/// Uploaded resources a scene needs
#[derive(Debug, Clone, PartialEq)]
pub struct SceneAssets {
    /// Ground plane model
    pub ground: Model,
    /// Ground albedo texture
    pub ground_texture: TextureHandle,
    /// Light proxies and markers
    pub light_meshes: LightMeshes,
}

impl SceneAssets {
    /// Generated stand-ins for the content pipeline
    ///
    /// The ground is a plane spanning `[0, 100]` on X and Z, so the default
    /// ground scale of 10 covers the whole light field. Its texture is a 2x2
    /// grey checker.
    pub fn placeholder(backend: &mut dyn RenderBackend) -> BackendResult<Self> {
        let plane = Mesh::plane().upload(backend)?;
        let ground = Model::new(vec![SubMesh {
            parent_transform: Mat4::new_translation(&Vec3::new(50.0, 0.0, 50.0))
                * Mat4::new_nonuniform_scaling(&Vec3::new(50.0, 1.0, 50.0)),
            mesh: plane,
        }]);

        let (light, dark) = ([200u8, 200, 200, 255], [90u8, 90, 90, 255]);
        let checker: Vec<u8> = [light, dark, dark, light].concat();
        let ground_texture = backend.upload_texture(2, 2, &checker)?;

        Ok(Self {
            ground,
            ground_texture,
            light_meshes: LightMeshes::generate(backend)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::{BackendCall, RecordingBackend};

    #[test]
    fn test_placeholder_assets_upload() {
        let mut backend = RecordingBackend::new(8);
        let assets = SceneAssets::placeholder(&mut backend).expect("assets");

        assert_eq!(assets.ground.parts.len(), 1);
        assert_eq!(backend.count_calls(|c| matches!(c, BackendCall::UploadTexture(_))), 1);
        assert_eq!(backend.mesh_sizes(assets.ground.parts[0].mesh), Some((4, 6)));
    }

    #[test]
    fn test_object_binds_material_and_normal_matrix() {
        let mut backend = RecordingBackend::new(8);
        let assets = SceneAssets::placeholder(&mut backend).expect("assets");
        let material = SurfaceMaterial::from_settings(&GroundSettings::default(), assets.ground_texture);
        let object = OpaqueObject::new(assets.ground.clone(), Mat4::new_scaling(10.0), material);
        backend.clear_log();

        object.draw_opaque(&mut backend).expect("draw");

        let world = object.world * object.model.parts[0].parent_transform;
        let calls = backend.calls();
        assert_eq!(calls[0], BackendCall::SetTechnique(EffectKind::Basic, Technique::ColorTextureLit));
        assert!(calls.contains(&BackendCall::SetParameter(
            EffectKind::Basic,
            ShaderParam::Material { ambient: 0.3, diffuse: 0.8, specular: 0.8, shininess: 30.0 }
        )));
        assert!(calls.contains(&BackendCall::SetParameter(EffectKind::Basic, ShaderParam::Tiling(Vec2::new(500.0, 500.0)))));
        assert!(calls.contains(&BackendCall::SetParameter(
            EffectKind::Basic,
            ShaderParam::InverseTransposeWorld(world.inverse_transpose())
        )));
        assert_eq!(backend.draw_count(), 1);
    }
}
