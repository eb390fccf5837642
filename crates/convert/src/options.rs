//! Conversion options.

use read_fonts::types::Tag;

/// Options for outline conversion.
#[derive(Debug, Clone)]
pub struct Options {
    /// Run the CFF subroutinizer on freshly built CharStrings.
    pub optimize_cff: bool,

    /// Attempt hint preservation through a [`HintTranslator`] collaborator.
    ///
    /// [`HintTranslator`]: crate::collab::HintTranslator
    pub preserve_hints: bool,

    /// Keep variation tables (`fvar`, `gvar`, `STAT`, ...) in the output.
    pub preserve_variations: bool,

    /// Materialize a static instance before converting (requires an
    /// [`InstanceGenerator`] collaborator and an `fvar` table).
    ///
    /// [`InstanceGenerator`]: crate::collab::InstanceGenerator
    pub generate_instance: bool,

    /// Axis pins for instance generation, user-space values.
    pub instance_coordinates: Vec<(Tag, f32)>,

    /// Minimum mined pattern length for the subroutinizer.
    pub min_pattern_length: usize,

    /// Upper bound on emitted subroutines.
    pub max_subroutines: usize,

    /// Restrict mining to stack-neutral patterns.
    pub stack_aware: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            optimize_cff: false,
            preserve_hints: false,
            preserve_variations: true,
            generate_instance: false,
            instance_coordinates: Vec::new(),
            min_pattern_length: 10,
            max_subroutines: 65_535,
            stack_aware: true,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn optimize_cff(mut self, value: bool) -> Self {
        self.optimize_cff = value;
        self
    }

    pub fn preserve_hints(mut self, value: bool) -> Self {
        self.preserve_hints = value;
        self
    }

    pub fn preserve_variations(mut self, value: bool) -> Self {
        self.preserve_variations = value;
        self
    }

    pub fn generate_instance(mut self, value: bool) -> Self {
        self.generate_instance = value;
        self
    }

    pub fn instance_coordinates(
        mut self,
        coordinates: impl IntoIterator<Item = (Tag, f32)>,
    ) -> Self {
        self.instance_coordinates = coordinates.into_iter().collect();
        self
    }

    pub fn min_pattern_length(mut self, value: usize) -> Self {
        self.min_pattern_length = value;
        self
    }

    pub fn max_subroutines(mut self, value: usize) -> Self {
        self.max_subroutines = value;
        self
    }

    pub fn stack_aware(mut self, value: bool) -> Self {
        self.stack_aware = value;
        self
    }
}
