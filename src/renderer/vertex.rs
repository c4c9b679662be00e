//! Vertex attributes and interleaved buffer layouts
//!
//! Each shading program reads a subset of the mesh attributes. The layout for
//! a program is derived from its attribute list: locations follow list order.

/// A per-vertex attribute a program can consume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttr {
    Position,
    Normal,
    TexCoord,
    /// xyz tangent, w handedness
    Tangent,
}

impl VertexAttr {
    /// Number of f32 components
    pub const fn components(self) -> usize {
        match self {
            VertexAttr::Position | VertexAttr::Normal => 3,
            VertexAttr::TexCoord => 2,
            VertexAttr::Tangent => 4,
        }
    }

    pub const fn format(self) -> wgpu::VertexFormat {
        match self {
            VertexAttr::Position | VertexAttr::Normal => wgpu::VertexFormat::Float32x3,
            VertexAttr::TexCoord => wgpu::VertexFormat::Float32x2,
            VertexAttr::Tangent => wgpu::VertexFormat::Float32x4,
        }
    }
}

/// Interleaved layout for an ordered attribute list
#[derive(Debug, Clone, PartialEq)]
pub struct VertexLayout {
    attrs: Vec<VertexAttr>,
    attributes: Vec<wgpu::VertexAttribute>,
    stride: wgpu::BufferAddress,
}

impl VertexLayout {
    pub fn new(attrs: &[VertexAttr]) -> Self {
        let mut offset = 0;
        let attributes = attrs
            .iter()
            .enumerate()
            .map(|(location, attr)| {
                let attribute = wgpu::VertexAttribute {
                    offset,
                    shader_location: location as u32,
                    format: attr.format(),
                };
                offset += (attr.components() * std::mem::size_of::<f32>()) as wgpu::BufferAddress;
                attribute
            })
            .collect();

        Self {
            attrs: attrs.to_vec(),
            attributes,
            stride: offset,
        }
    }

    pub fn attrs(&self) -> &[VertexAttr] {
        &self.attrs
    }

    /// Floats per vertex
    pub fn floats_per_vertex(&self) -> usize {
        self.attrs.iter().map(|a| a.components()).sum()
    }

    pub fn stride(&self) -> wgpu::BufferAddress {
        self.stride
    }

    pub fn desc(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_offsets_follow_order() {
        let layout = VertexLayout::new(&[
            VertexAttr::Position,
            VertexAttr::Normal,
            VertexAttr::TexCoord,
            VertexAttr::Tangent,
        ]);
        let desc = layout.desc();
        let offsets: Vec<u64> = desc.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24, 32]);
        let locations: Vec<u32> = desc.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, vec![0, 1, 2, 3]);
        assert_eq!(layout.stride(), 48);
        assert_eq!(layout.floats_per_vertex(), 12);
    }

    #[test]
    fn test_position_only_layout() {
        let layout = VertexLayout::new(&[VertexAttr::Position]);
        assert_eq!(layout.stride(), 12);
        assert_eq!(layout.desc().attributes[0].format, wgpu::VertexFormat::Float32x3);
    }
}
