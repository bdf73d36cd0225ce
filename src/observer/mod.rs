//! Observers sample the simulation state at integral dates.
//!
//! Values are copied out at observation time since each state is dropped
//! once the next one replaces it.

mod variable;

pub use variable::{ObservableVariable, ObservedItem};

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::context::Context;
use crate::distribution::DiscreteDistribution;
use crate::error::{Result, SimError};
use crate::export::ObservationWriter;
use crate::parameters::Parameters;
use crate::state::State;

/// A value captured at one date.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Scalar(f64),
    Distribution(DiscreteDistribution),
    /// Class → distribution
    DistributionMap(BTreeMap<String, DiscreteDistribution>),
}

/// One variable of one item, recorded at a set of integral dates.
#[derive(Debug, Clone, PartialEq)]
pub struct Observer {
    item: ObservedItem,
    variable: ObservableVariable,
    dates: BTreeSet<i64>,
    records: Vec<(i64, Observation)>,
}

impl Observer {
    /// Fails if the item is unknown or does not expose `variable`.
    pub fn new(
        parameters: &Parameters,
        item: ObservedItem,
        variable: ObservableVariable,
        dates: BTreeSet<i64>,
    ) -> Result<Self> {
        item.check(parameters)?;
        if !item.variables().contains(&variable) {
            return Err(SimError::Setup(format!(
                "{} has no observable variable {}",
                item, variable
            )));
        }
        Ok(Self {
            item,
            variable,
            dates,
            records: Vec::new(),
        })
    }

    pub fn item(&self) -> &ObservedItem {
        &self.item
    }

    pub fn variable(&self) -> ObservableVariable {
        self.variable
    }

    pub fn dates(&self) -> &BTreeSet<i64> {
        &self.dates
    }

    pub fn records(&self) -> &[(i64, Observation)] {
        &self.records
    }

    /// Record the variable if `date` is one of the observed dates.
    pub fn observe(&mut self, state: &State, date: i64) -> Result<()> {
        if self.dates.contains(&date) {
            let value = self.capture(state)?;
            self.records.push((date, value));
        }
        Ok(())
    }

    fn capture(&self, state: &State) -> Result<Observation> {
        use ObservableVariable as V;
        let observation = match (&self.item, self.variable) {
            (ObservedItem::State, V::Respiration) => Observation::Scalar(state.respiration()?),
            (ObservedItem::Pool(key), V::Mass) => {
                Observation::Scalar(state.substrate().pool_by_key(key)?.mass())
            }
            (ObservedItem::Pool(key), V::MassDistribution) => Observation::Distribution(
                state.substrate().pool_by_key(key)?.distribution().clone(),
            ),
            (ObservedItem::PoolTransfer(key), V::FluxDistribution) => {
                Observation::Distribution(state.transfer(key)?.flux()?.clone())
            }
            (ObservedItem::Microbe(name), variable) => {
                let microbe = state.microbe(name)?;
                match variable {
                    V::Mass => Observation::Scalar(microbe.mass()),
                    V::Respiration => Observation::Scalar(microbe.respiration()?),
                    V::MortalityFlux => Observation::Scalar(microbe.mortality_flux()?),
                    V::UptakeFluxDistributionMap => {
                        Observation::DistributionMap(microbe.uptake_flux()?.clone())
                    }
                    V::CarbonUseEfficiencyDistributionMap => {
                        Observation::DistributionMap(microbe.carbon_use_efficiency()?.clone())
                    }
                    other => return Err(self.unobservable(other)),
                }
            }
            (ObservedItem::Enzyme(name), variable) => {
                let enzyme = state.enzyme(name)?;
                match variable {
                    V::DepolymerizationRateDistribution => Observation::Distribution(
                        enzyme.depolymerization_rate()?.as_distribution().clone(),
                    ),
                    V::ActivityDistribution => {
                        Observation::Distribution(enzyme.activity_distribution()?.clone())
                    }
                    V::Activity => Observation::Scalar(enzyme.activity()?),
                    other => return Err(self.unobservable(other)),
                }
            }
            (_, other) => return Err(self.unobservable(other)),
        };
        Ok(observation)
    }

    fn unobservable(&self, variable: ObservableVariable) -> SimError {
        SimError::Setup(format!("{} has no observable variable {}", self.item, variable))
    }

    /// `<type>_<variable>.csv` for the state, `<type>_<item>_<variable>.csv`
    /// otherwise.
    pub fn file_name(&self) -> String {
        match self.item.label() {
            Some(label) => format!("{}_{}_{}.csv", self.item.kind(), label, self.variable),
            None => format!("{}_{}.csv", self.item.kind(), self.variable),
        }
    }

    pub fn header(&self) -> Vec<String> {
        let value = self.variable.value_label().to_string();
        match self.variable {
            ObservableVariable::UptakeFluxDistributionMap
            | ObservableVariable::CarbonUseEfficiencyDistributionMap => vec![
                "date".to_string(),
                "biochemical_class".to_string(),
                "polymerization".to_string(),
                value,
            ],
            ObservableVariable::MassDistribution
            | ObservableVariable::FluxDistribution
            | ObservableVariable::DepolymerizationRateDistribution
            | ObservableVariable::ActivityDistribution => {
                vec!["date".to_string(), "polymerization".to_string(), value]
            }
            _ => vec!["date".to_string(), value],
        }
    }

    /// Recorded values, one row per scalar or per grid point.
    pub fn rows(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        for (date, observation) in &self.records {
            match observation {
                Observation::Scalar(value) => rows.push(vec![date.to_string(), value.to_string()]),
                Observation::Distribution(d) => {
                    for (x, y) in d.x().iter().zip(d.y()) {
                        rows.push(vec![date.to_string(), x.to_string(), y.to_string()]);
                    }
                }
                Observation::DistributionMap(map) => {
                    for (class, d) in map {
                        for (x, y) in d.x().iter().zip(d.y()) {
                            rows.push(vec![
                                date.to_string(),
                                class.clone(),
                                x.to_string(),
                                y.to_string(),
                            ]);
                        }
                    }
                }
            }
        }
        rows
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObserverList {
    observers: Vec<Observer>,
}

impl ObserverList {
    /// Every variable of every item at every integral date of the timeline.
    pub fn default_for(parameters: &Parameters, context: &Context) -> Result<Self> {
        let dates: BTreeSet<i64> = (context.initial_date()..=context.final_date()).collect();
        let mut list = Self::default();
        for item in ObservedItem::all(parameters) {
            for variable in item.variables() {
                list.push(Observer::new(parameters, item.clone(), *variable, dates.clone())?);
            }
        }
        Ok(list)
    }

    pub fn push(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observer> {
        self.observers.iter()
    }

    pub fn observe(&mut self, state: &State, date: i64) -> Result<()> {
        for observer in self.observers.iter_mut() {
            observer.observe(state, date)?;
        }
        Ok(())
    }

    /// One tab-separated file per observer in `output_dir`.
    pub fn write(&self, output_dir: &Path, append: bool) -> anyhow::Result<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(self.observers.len());
        for observer in &self.observers {
            let path = output_dir.join(observer.file_name());
            let mut writer = ObservationWriter::open(&path, &observer.header(), append)?;
            for row in observer.rows() {
                writer.write_row(&row)?;
            }
            paths.push(writer.finish()?);
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{IntegrationMethod, Interval};
    use crate::parameters::{Accessibility, PoolKey};

    fn setup() -> (Parameters, Context, State) {
        let mut p = Parameters::new(IntegrationMethod::Trapezoid, 0.5);
        p.add_class("protein", Interval::new(0.0, 1.0).unwrap()).unwrap();
        p.add_accessibility("protein", Accessibility::Accessible).unwrap();
        let c = Context::new("day", 0, 3, 1.0).unwrap();
        p.finalize(&c).unwrap();
        let mut s = State::from_parameters(&p, 0.0).unwrap();
        s.substrate_mut()
            .accessible_pool_mut("protein")
            .unwrap()
            .set_values(vec![1.0, 2.0, 3.0])
            .unwrap();
        s.evaluate(&p, &c).unwrap();
        (p, c, s)
    }

    fn pool() -> ObservedItem {
        ObservedItem::Pool(PoolKey::new("protein", Accessibility::Accessible))
    }

    #[test]
    fn test_rejects_unknown_items_and_variables() {
        let (p, _, _) = setup();
        let dates = BTreeSet::from([0]);
        assert!(Observer::new(&p, pool(), ObservableVariable::Activity, dates.clone()).is_err());
        let missing = ObservedItem::Microbe("archaea".to_string());
        assert!(Observer::new(&p, missing, ObservableVariable::Mass, dates).is_err());
    }

    #[test]
    fn test_records_only_selected_dates() {
        let (p, _, s) = setup();
        let mut o = Observer::new(&p, pool(), ObservableVariable::Mass, BTreeSet::from([0, 2])).unwrap();
        o.observe(&s, 0).unwrap();
        o.observe(&s, 1).unwrap();
        assert_eq!(o.records().len(), 1);
        assert_eq!(o.records()[0], (0, Observation::Scalar(2.0)));
        assert_eq!(o.rows(), vec![vec!["0".to_string(), "2".to_string()]]);
    }

    #[test]
    fn test_distribution_rows_and_file_names() {
        let (p, _, s) = setup();
        let mut o = Observer::new(&p, pool(), ObservableVariable::MassDistribution, BTreeSet::from([0])).unwrap();
        o.observe(&s, 0).unwrap();
        assert_eq!(o.header(), vec!["date", "polymerization", "mass"]);
        assert_eq!(o.rows().len(), 3);
        assert_eq!(o.rows()[2], vec!["0", "1", "3"]);
        assert_eq!(
            o.file_name(),
            format!("pool_{}_mass_distribution.csv", PoolKey::new("protein", Accessibility::Accessible).label())
        );

        let state = Observer::new(&p, ObservedItem::State, ObservableVariable::Respiration, BTreeSet::new()).unwrap();
        assert_eq!(state.file_name(), "state_respiration.csv");
    }

    #[test]
    fn test_default_list_covers_every_variable() {
        let (p, c, _) = setup();
        let list = ObserverList::default_for(&p, &c).unwrap();
        // state respiration + pool mass and mass distribution
        assert_eq!(list.len(), 3);
        assert!(list.iter().all(|o| o.dates().len() == 4));
    }
}
