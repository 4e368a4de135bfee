//! Node graph to BSDF translation.
//!
//! Node graphs cannot be mapped onto Nori's analytic BSDFs in general. We look
//! for a handful of well known nodes, in a fixed order, and approximate the
//! material with the first one that is present.

use scene_common::{Material, MaterialSlot, NodeInput, ShaderGraph, ShaderNode};

use crate::{
    asset_stager::AssetStager,
    color_texture::{ColorInput, ColorResolver},
    config_loader::ExportOptions,
    document::{format_float, format_rgb, Element},
    error::MaterialError,
};

/// Albedo of meshes that have no material at all.
pub const DEFAULT_ALBEDO: [f32; 3] = [0.75, 0.75, 0.75];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecognizedBsdfPattern {
    /// Nothing we know, use the flat diffuse color.
    None,
    Glass,
    Glossy,
    Diffuse,
    Principled,
    Specular,
}

impl RecognizedBsdfPattern {
    /// First match wins.
    pub const PRIORITY: [RecognizedBsdfPattern; 5] = [
        RecognizedBsdfPattern::Glass,
        RecognizedBsdfPattern::Glossy,
        RecognizedBsdfPattern::Diffuse,
        RecognizedBsdfPattern::Principled,
        RecognizedBsdfPattern::Specular,
    ];

    pub fn node_name(&self) -> Option<&'static str> {
        match self {
            RecognizedBsdfPattern::None => None,
            RecognizedBsdfPattern::Glass => Some("Glass BSDF"),
            RecognizedBsdfPattern::Glossy => Some("Glossy BSDF"),
            RecognizedBsdfPattern::Diffuse => Some("Diffuse BSDF"),
            RecognizedBsdfPattern::Principled => Some("Principled BSDF"),
            RecognizedBsdfPattern::Specular => Some("Specular"),
        }
    }

    /// With `export_colors` off every graph is treated as unrecognized.
    pub fn detect(graph: &ShaderGraph, export_colors: bool) -> Self {
        if !export_colors {
            return RecognizedBsdfPattern::None;
        }
        Self::PRIORITY
            .into_iter()
            .find(|pattern| pattern.node_name().map_or(false, |name| graph.contains(name)))
            .unwrap_or(RecognizedBsdfPattern::None)
    }
}

/// The BSDF used for meshes without any material slot.
pub fn default_bsdf() -> Element {
    Element::typed("bsdf", "diffuse").with_child(Element::entry(
        "color",
        "albedo",
        format_rgb(DEFAULT_ALBEDO),
    ))
}

fn flat_diffuse_bsdf(material: &Material) -> Element {
    let [r, g, b, _] = material.diffuse_color;
    Element::typed("bsdf", "diffuse")
        .with_attr("name", material.name.as_str())
        .with_child(Element::entry("color", "albedo", format_rgb([r, g, b])))
}

pub struct MaterialTranslator<'a> {
    options: &'a ExportOptions,
    stager: &'a mut AssetStager,
}

impl<'a> MaterialTranslator<'a> {
    pub fn new(options: &'a ExportOptions, stager: &'a mut AssetStager) -> Self {
        Self { options, stager }
    }

    pub fn translate(&mut self, slot: &MaterialSlot) -> Element {
        match &slot.material {
            Some(material) => self.translate_material(material),
            None => default_bsdf(),
        }
    }

    /// Always produces a BSDF. Graphs that match a pattern but are malformed
    /// degrade to the flat diffuse color.
    pub fn translate_material(&mut self, material: &Material) -> Element {
        let Some(graph) = &material.graph else {
            return flat_diffuse_bsdf(material);
        };
        let pattern = RecognizedBsdfPattern::detect(graph, self.options.export_material_colors);
        log::debug!("Material {:?} translated as {:?}", material.name, pattern);

        self.try_translate(material, graph, pattern)
            .unwrap_or_else(|err| {
                log::warn!(
                    "Material {:?} does not look like a {:?}, using its flat color: {}",
                    material.name,
                    pattern,
                    err
                );
                flat_diffuse_bsdf(material)
            })
    }

    fn try_translate(
        &mut self,
        material: &Material,
        graph: &ShaderGraph,
        pattern: RecognizedBsdfPattern,
    ) -> Result<Element, MaterialError> {
        let Some(node) = NodeReader::for_pattern(graph, pattern) else {
            return Ok(flat_diffuse_bsdf(material));
        };
        let bsdf = |plugin_type: &str| {
            Element::typed("bsdf", plugin_type).with_attr("name", material.name.as_str())
        };
        let mut colors = ColorResolver::new(&mut *self.stager, self.options.export_textures);

        // Every input is read before anything gets staged, so a malformed node
        // leaves no orphaned texture behind.
        let element = match pattern {
            RecognizedBsdfPattern::None => flat_diffuse_bsdf(material),
            RecognizedBsdfPattern::Glass => {
                let color = node.color("Color")?;
                let params = [
                    float_entry("IOR", node.float("IOR")?),
                    float_entry("roughness", node.float("Roughness")?),
                ];
                bsdf("dielectric")
                    .with_child(colors.resolve("color", color))
                    .with_children(params)
            }
            RecognizedBsdfPattern::Glossy => {
                let color = node.color("Color")?;
                let alpha = float_entry("alpha", node.float("Roughness")?);
                bsdf("roughconductor")
                    .with_child(colors.resolve("R0", color))
                    .with_child(alpha)
            }
            RecognizedBsdfPattern::Diffuse => {
                bsdf("diffuse").with_child(colors.resolve("albedo", node.color("Color")?))
            }
            RecognizedBsdfPattern::Principled if self.options.disney_bsdf => {
                let base_color = node.color("Base Color")?;
                let params = [
                    float_entry("metallic", node.float("Metallic")?),
                    float_entry("subsurface", node.float("Subsurface Weight")?),
                    float_entry("specular", node.float("Specular IOR Level")?),
                    color_entry("specularTint", node.rgb("Specular Tint")?),
                    float_entry("roughness", node.float("Roughness")?),
                    float_entry("anisotropic", node.float("Anisotropic")?),
                    float_entry("sheen", node.float("Sheen Weight")?),
                    color_entry("sheenTint", node.rgb("Sheen Tint")?),
                    float_entry("clearcoat", node.float("Coat Weight")?),
                    float_entry("clearcoatGloss", node.float("Coat Roughness")?),
                ];
                bsdf("disney")
                    .with_child(colors.resolve("baseColor", base_color))
                    .with_children(params)
            }
            RecognizedBsdfPattern::Principled => {
                let base_color = node.color("Base Color")?;
                let alpha = float_entry("alpha", node.float("Roughness")?);
                bsdf("roughsubstrate")
                    .with_child(colors.resolve("kd", base_color))
                    .with_child(alpha)
            }
            RecognizedBsdfPattern::Specular => bsdf("mirror"),
        };
        Ok(element)
    }
}

fn float_entry(name: &str, value: f32) -> Element {
    Element::entry("float", name, format_float(value))
}

fn color_entry(name: &str, value: [f32; 3]) -> Element {
    Element::entry("color", name, format_rgb(value))
}

/// Typed access to the inputs of one named node.
pub(crate) struct NodeReader<'a> {
    graph: &'a ShaderGraph,
    name: &'static str,
    node: &'a ShaderNode,
}

impl<'a> NodeReader<'a> {
    pub fn new(graph: &'a ShaderGraph, name: &'static str) -> Option<Self> {
        graph.node(name).map(|node| Self { graph, name, node })
    }

    fn for_pattern(graph: &'a ShaderGraph, pattern: RecognizedBsdfPattern) -> Option<Self> {
        pattern.node_name().and_then(|name| Self::new(graph, name))
    }

    pub fn input(&self, input: &str) -> Result<&'a NodeInput, MaterialError> {
        self.node
            .input(input)
            .ok_or_else(|| MaterialError::MissingInput {
                node: self.name.into(),
                input: input.into(),
            })
    }

    pub fn float(&self, input: &str) -> Result<f32, MaterialError> {
        self.input(input)?
            .value
            .as_float()
            .ok_or_else(|| self.unexpected(input, "float"))
    }

    pub fn rgb(&self, input: &str) -> Result<[f32; 3], MaterialError> {
        self.input(input)?
            .value
            .as_rgb()
            .ok_or_else(|| self.unexpected(input, "color"))
    }

    pub fn color(&self, input: &str) -> Result<ColorInput<'a>, MaterialError> {
        let value = self.rgb(input)?;
        Ok(ColorInput::from_socket(self.graph, self.input(input)?, value))
    }

    fn unexpected(&self, input: &str, expected: &'static str) -> MaterialError {
        MaterialError::UnexpectedValue {
            node: self.name.into(),
            input: input.into(),
            expected,
        }
    }
}
