//! Shading program selection
//!
//! Programs are compiled once at startup. Switching the active program
//! repacks every entity's vertices for the new attribute layout before the
//! next draw.

use super::vertex::VertexAttr;

/// The fixed set of shading programs, in selection order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadingModel {
    Texture,
    BlinnPhong,
    Phong,
    Gouraud,
    Normal,
    Depth,
}

impl ShadingModel {
    pub const ALL: [ShadingModel; 6] = [
        ShadingModel::Texture,
        ShadingModel::BlinnPhong,
        ShadingModel::Phong,
        ShadingModel::Gouraud,
        ShadingModel::Normal,
        ShadingModel::Depth,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Shader file stem under `assets/shaders`
    pub fn name(&self) -> &'static str {
        match self {
            ShadingModel::Texture => "texture",
            ShadingModel::BlinnPhong => "blinnphong",
            ShadingModel::Phong => "phong",
            ShadingModel::Gouraud => "gouraud",
            ShadingModel::Normal => "normal",
            ShadingModel::Depth => "depth",
        }
    }

    /// Vertex attributes the program's vertex stage consumes
    pub fn attributes(&self) -> &'static [VertexAttr] {
        use VertexAttr::*;
        match self {
            ShadingModel::Texture => &[Position, Normal, TexCoord],
            ShadingModel::BlinnPhong => &[Position, Normal, TexCoord, Tangent],
            ShadingModel::Phong | ShadingModel::Gouraud | ShadingModel::Normal => {
                &[Position, Normal]
            }
            ShadingModel::Depth => &[Position],
        }
    }

    /// Whether the environment backdrop is composited behind this program
    pub fn uses_environment(&self) -> bool {
        matches!(self, ShadingModel::Texture | ShadingModel::BlinnPhong)
    }
}

/// Something holding a vertex buffer laid out for a specific program
pub trait VertexBinding<Ctx: ?Sized> {
    /// Rebuild the binding for a new attribute list
    fn rebuild_binding(&mut self, ctx: &Ctx, attrs: &[VertexAttr]);
}

/// Compiled programs plus the index of the active one
pub struct ShadingSelector<P> {
    programs: Vec<(ShadingModel, P)>,
    active: usize,
}

impl<P> ShadingSelector<P> {
    /// Build one program per model in `ShadingModel::ALL`
    pub fn build<E>(mut compile: impl FnMut(ShadingModel) -> Result<P, E>) -> Result<Self, E> {
        let programs = ShadingModel::ALL
            .iter()
            .map(|model| compile(*model).map(|p| (*model, p)))
            .collect::<Result<Vec<_>, E>>()?;
        Ok(Self {
            programs,
            active: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_model(&self) -> ShadingModel {
        self.programs[self.active].0
    }

    pub fn active_program(&self) -> &P {
        &self.programs[self.active].1
    }

    /// Give every entity a binding for the active program
    pub fn bind_all<C: ?Sized>(&self, ctx: &C, entities: &mut [&mut dyn VertexBinding<C>]) {
        let attrs = self.active_model().attributes();
        for entity in entities.iter_mut() {
            entity.rebuild_binding(ctx, attrs);
        }
    }

    /// Make `index` the active program
    ///
    /// Returns `true` when the program changed and entities were rebound.
    /// Unchanged or out-of-range selections leave everything untouched.
    pub fn select<C: ?Sized>(
        &mut self,
        index: usize,
        ctx: &C,
        entities: &mut [&mut dyn VertexBinding<C>],
    ) -> bool {
        if index == self.active {
            return false;
        }
        if index >= self.programs.len() {
            log::warn!("Ignoring out-of-range program index {index}");
            return false;
        }

        self.active = index;
        self.bind_all(ctx, entities);
        log::info!("Switched to {} program", self.active_model().name());
        true
    }

    /// Consume the selector, handing back every compiled program
    pub fn into_programs(self) -> impl Iterator<Item = P> {
        self.programs.into_iter().map(|(_, p)| p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingBinding {
        rebuilds: usize,
        last: Vec<VertexAttr>,
    }

    impl VertexBinding<()> for CountingBinding {
        fn rebuild_binding(&mut self, _ctx: &(), attrs: &[VertexAttr]) {
            self.rebuilds += 1;
            self.last = attrs.to_vec();
        }
    }

    fn selector() -> ShadingSelector<&'static str> {
        ShadingSelector::build(|m| Ok::<_, ()>(m.name())).unwrap()
    }

    #[test]
    fn test_build_compiles_every_program_in_order() {
        let s = selector();
        assert_eq!(s.len(), 6);
        assert_eq!(s.active_model(), ShadingModel::Texture);
        assert_eq!(*s.active_program(), "texture");
        let names: Vec<_> = s.into_programs().collect();
        assert_eq!(
            names,
            ["texture", "blinnphong", "phong", "gouraud", "normal", "depth"]
        );
    }

    #[test]
    fn test_build_propagates_compile_failure() {
        let result = ShadingSelector::build(|m| {
            if m == ShadingModel::Gouraud { Err(m.name()) } else { Ok(()) }
        });
        assert_eq!(result.err(), Some("gouraud"));
    }

    #[test]
    fn test_switch_rebuilds_each_entity_once() {
        let mut s = selector();
        let mut obstacle = CountingBinding::default();
        let mut ship = CountingBinding::default();

        assert!(s.select(4, &(), &mut [&mut obstacle, &mut ship]));
        assert_eq!(obstacle.rebuilds, 1);
        assert_eq!(ship.rebuilds, 1);
        assert_eq!(ship.last, ShadingModel::Normal.attributes());
    }

    #[test]
    fn test_unchanged_selection_does_not_rebuild() {
        let mut s = selector();
        let mut obstacle = CountingBinding::default();

        assert!(!s.select(0, &(), &mut [&mut obstacle]));
        assert!(s.select(1, &(), &mut [&mut obstacle]));
        for _ in 0..10 {
            assert!(!s.select(1, &(), &mut [&mut obstacle]));
        }
        assert_eq!(obstacle.rebuilds, 1);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut s = selector();
        let mut obstacle = CountingBinding::default();

        assert!(!s.select(6, &(), &mut [&mut obstacle]));
        assert_eq!(s.active_index(), 0);
        assert_eq!(obstacle.rebuilds, 0);
    }

    #[test]
    fn test_backdrop_only_for_textured_programs() {
        let with_backdrop: Vec<_> = ShadingModel::ALL
            .iter()
            .filter(|m| m.uses_environment())
            .collect();
        assert_eq!(
            with_backdrop,
            [&ShadingModel::Texture, &ShadingModel::BlinnPhong]
        );
    }

    #[test]
    fn test_attribute_lists_start_with_position() {
        for model in ShadingModel::ALL {
            assert_eq!(model.attributes()[0], VertexAttr::Position);
        }
        assert_eq!(ShadingModel::from_index(1), Some(ShadingModel::BlinnPhong));
        assert_eq!(ShadingModel::from_index(6), None);
    }
}
