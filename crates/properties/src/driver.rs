//! The `BasePlasma` driver.
//!
//! Owns the context and an ordered list of properties. An update pass walks
//! the properties in registration order, updates each against the context, and
//! publishes the new value under the property's name. The caller registers
//! properties in dependency order; the driver does not sort them.

use std::sync::Arc;

use plasma::{
    AtomicDataSource, Calculation, LabeledTable, LevelKey, NlteConfig, PhysicalConstants,
    PlasmaContext, PlasmaError, PlasmaProperty, PlasmaRunId, PropertyName, PropertyValue,
    ValueRegistry,
};
use tracing::{error, info, info_span};

use crate::{names, AtomicDataProperty, BetaRadiation, LevelBoltzmannFactor, PartitionFunction};

/// A property graph together with the context it reads from and publishes to.
#[derive(Debug, Default)]
pub struct BasePlasma {
    context: ValueRegistry,
    properties: Vec<PlasmaProperty>,
}

impl BasePlasma {
    /// Creates a driver over a context pre-populated with external inputs.
    pub fn new(context: ValueRegistry) -> Self {
        Self {
            context,
            properties: Vec::new(),
        }
    }

    /// Assembles the standard graph: `levels`, `lines`, `beta_rad`,
    /// `level_boltzmann_factor`, `partition_function`.
    ///
    /// `level_populations` is seeded with an empty table; it is only read once
    /// NLTE overrides are active, by which point the caller has supplied real
    /// populations through [`BasePlasma::set_input`].
    pub fn lte(
        atomic_data: Arc<dyn AtomicDataSource>,
        t_rad: Vec<f64>,
        w: Vec<f64>,
        nlte: NlteConfig,
        constants: &PhysicalConstants,
    ) -> Result<Self, PlasmaError> {
        let n_cells = t_rad.len();
        let mut context = ValueRegistry::new();
        context.insert(names::ATOMIC_DATA, atomic_data)?;
        context.insert(names::T_RAD, t_rad)?;
        context.insert(names::W, w)?;
        context.insert(names::NLTE, nlte)?;
        context.insert(
            names::LEVEL_POPULATIONS,
            LabeledTable::<LevelKey>::from_fn(Vec::new(), n_cells, |_, _| 0.0),
        )?;

        let mut plasma = Self::new(context);
        plasma.add_property(AtomicDataProperty::levels())?;
        plasma.add_property(AtomicDataProperty::lines())?;
        plasma.add_property(BetaRadiation::new(constants))?;
        plasma.add_property(LevelBoltzmannFactor)?;
        plasma.add_property(PartitionFunction)?;
        Ok(plasma)
    }

    /// Appends a property to the graph.
    ///
    /// Fails if the name is already taken by another property or by an
    /// external input: every name has a single writer.
    pub fn add_property(
        &mut self,
        calculation: impl Calculation + 'static,
    ) -> Result<(), PlasmaError> {
        let property = PlasmaProperty::new(calculation)?;
        if self.property(property.name().as_str()).is_some()
            || self.context.contains(property.name().as_str())
        {
            return Err(PlasmaError::DuplicateProperty {
                name: property.name().clone(),
            });
        }
        self.properties.push(property);
        Ok(())
    }

    /// Replaces an external input between passes.
    ///
    /// Names owned by a property cannot be written this way.
    pub fn set_input(
        &mut self,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<(), PlasmaError> {
        if let Some(property) = self.property(name) {
            return Err(PlasmaError::DuplicateProperty {
                name: property.name().clone(),
            });
        }
        self.context.insert(name, value)
    }

    /// Runs one update pass over every property, in registration order.
    ///
    /// Stops at the first failing property; values published earlier in the
    /// pass stay published.
    pub fn update(&mut self) -> Result<PlasmaRunId, PlasmaError> {
        let run_id = PlasmaRunId::new_random();
        let span = info_span!("plasma_update", %run_id, properties = self.properties.len());
        let _guard = span.enter();

        for property in &mut self.properties {
            if let Err(err) = property.update(&self.context) {
                error!(property = %property.name(), error = %err, "Property update failed");
                return Err(err);
            }
            if let Some(value) = property.value() {
                self.context.set(property.name().clone(), value.clone());
            }
        }

        info!("Plasma update complete");
        Ok(run_id)
    }

    /// Returns the current value published under `name`.
    pub fn get(&self, name: &str) -> Option<PropertyValue> {
        self.context.get(name)
    }

    /// Returns the property registered under `name`.
    pub fn property(&self, name: &str) -> Option<&PlasmaProperty> {
        self.properties.iter().find(|p| p.name().as_str() == name)
    }

    /// Returns the property names in update order.
    pub fn property_names(&self) -> Vec<&PropertyName> {
        self.properties.iter().map(|p| p.name()).collect()
    }

    /// Returns the label of every property, in update order.
    pub fn labels(&self) -> Vec<String> {
        self.properties.iter().map(|p| p.label()).collect()
    }
}
