//! The property node contract.
//!
//! A property is split in two:
//!
//! - [`Calculation`]: the variant-specific part: the property's name, the
//!   names of its inputs, and `calculate`, a function from resolved inputs to
//!   the property's value. This is the single extension point; every concrete
//!   property implements it and nothing else.
//! - [`PlasmaProperty`]: the generic part: it resolves the declared inputs
//!   against a [`PlasmaContext`], calls `calculate`, and stores the result in
//!   its value slot.
//!
//! `update` never caches. Any caching (see the memoized atomic-data
//! properties) is the calculation's own business.

use tracing::debug;

use crate::{Inputs, PlasmaContext, PlasmaError, PropertyName, PropertyValue};

/// The variant-specific half of a property.
///
/// Implementations are free to hold state fixed at construction (a snapshot of
/// a physical constant) or state that evolves across calls (a memoized load).
pub trait Calculation: Send + std::fmt::Debug {
    /// Name under which the value is published.
    fn name(&self) -> &'static str;

    /// Names of the inputs, in the order `calculate` receives them.
    fn inputs(&self) -> &'static [&'static str];

    /// Human-readable description of the value's type.
    fn type_str(&self) -> &'static str;

    /// Optional LaTeX rendering of the formula.
    fn latex_str(&self) -> Option<&'static str> {
        None
    }

    /// Computes the value from the resolved inputs.
    fn calculate(&mut self, inputs: &Inputs<'_>) -> Result<PropertyValue, PlasmaError>;
}

/// A node in the property graph: a [`Calculation`] plus its value slot.
#[derive(Debug)]
pub struct PlasmaProperty {
    name: PropertyName,
    calculation: Box<dyn Calculation>,
    value: Option<PropertyValue>,
}

impl PlasmaProperty {
    /// Wraps a calculation in a node with an empty value slot.
    ///
    /// Returns [`PlasmaError::InvalidName`] if the calculation's name is empty.
    pub fn new(calculation: impl Calculation + 'static) -> Result<Self, PlasmaError> {
        Self::from_boxed(Box::new(calculation))
    }

    /// Wraps an already boxed calculation.
    pub fn from_boxed(calculation: Box<dyn Calculation>) -> Result<Self, PlasmaError> {
        let name = PropertyName::new(calculation.name()).ok_or(PlasmaError::InvalidName)?;
        Ok(Self {
            name,
            calculation,
            value: None,
        })
    }

    /// Returns the property's name.
    pub fn name(&self) -> &PropertyName {
        &self.name
    }

    /// Returns the declared input names.
    pub fn inputs(&self) -> &'static [&'static str] {
        self.calculation.inputs()
    }

    /// Returns the last computed value, or `None` before the first successful
    /// update.
    pub fn value(&self) -> Option<&PropertyValue> {
        self.value.as_ref()
    }

    /// Resolves the declared inputs, calculates, and stores the result.
    ///
    /// On failure the value slot keeps whatever it held before.
    pub fn update(&mut self, context: &dyn PlasmaContext) -> Result<(), PlasmaError> {
        let names = self.calculation.inputs();
        let values = names
            .iter()
            .map(|input| {
                context.get(input).ok_or_else(|| PlasmaError::MissingInput {
                    property: self.name.clone(),
                    input: input.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let inputs = Inputs::new(&self.name, names, values);
        let value = self.calculation.calculate(&inputs)?;
        debug!(property = %self.name, kind = value.kind(), "Property updated");
        self.value = Some(value);
        Ok(())
    }

    /// Returns a three-line description: name, type, and formula (possibly
    /// empty).
    pub fn label(&self) -> String {
        format!(
            "Name: {}\nType: {}\n{}",
            self.name,
            self.calculation.type_str(),
            self.calculation.latex_str().unwrap_or_default()
        )
    }
}
