//! Transaction application: moves resources for an already-resolved amount.
//!
//! The applier trusts the resolver's bound. It withdraws every input, then
//! deposits every output, and never aborts or rolls back part-way. A
//! transfer that moves materially less than asked for is logged as a
//! discrepancy and reported, nothing more.

use serde::{Deserialize, Serialize};

use crate::constants::TRANSFER_TOLERANCE;
use crate::converter::ConverterConfig;
use crate::ratio::ResourceRatio;
use crate::resolver::TickContext;
use crate::store::ResourceStore;

/// One resource movement performed by the applier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub resource: String,
    /// Positive amount the applier asked for.
    pub desired: f64,
    /// Positive amount actually moved.
    pub actual: f64,
    pub direction: TransferDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferDirection {
    Consumed,
    Produced,
}

/// Everything one application moved, plus any shortfalls worth a warning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyReport {
    pub transfers: Vec<Transfer>,
    /// Indices into `transfers` that fell short of the tolerance.
    pub discrepancies: Vec<usize>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty()
    }

    /// Total moved for a resource in a given direction.
    pub fn moved(&self, resource: &str, direction: TransferDirection) -> f64 {
        self.transfers
            .iter()
            .filter(|t| t.resource == resource && t.direction == direction)
            .map(|t| t.actual)
            .sum()
    }
}

fn desired_transfer(ratio: &ResourceRatio, amount: f64, electricity_cap: f64) -> f64 {
    if ratio.resource.is_electric() {
        amount.min(electricity_cap) * ratio.ratio
    } else {
        amount * ratio.ratio
    }
}

/// Withdraw inputs and deposit outputs for `amount` units of conversion.
///
/// An amount of zero (or less) moves nothing.
pub fn apply<S: ResourceStore + ?Sized>(
    config: &ConverterConfig,
    amount: f64,
    ctx: &TickContext,
    store: &mut S,
) -> ApplyReport {
    let mut report = ApplyReport::default();
    if amount <= 0.0 {
        return report;
    }
    let electricity_cap = ctx.electricity_cap(config.conversion_rate);

    for input in &config.inputs {
        let desired = desired_transfer(input, amount, electricity_cap);
        let actual = store.transfer(&input.resource, desired);
        if actual < desired * TRANSFER_TOLERANCE {
            log::warn!(
                "{}: obtained less {} than expected: {:.9}/{:.9}",
                config.name,
                input.resource.name,
                desired,
                actual
            );
            report.discrepancies.push(report.transfers.len());
        }
        report.transfers.push(Transfer {
            resource: input.resource.name.clone(),
            desired,
            actual,
            direction: TransferDirection::Consumed,
        });
    }

    for output in &config.outputs {
        let desired = desired_transfer(output, amount, electricity_cap);
        let actual = -store.transfer(&output.resource, -desired);
        if actual < desired * TRANSFER_TOLERANCE && !output.allow_extra {
            log::warn!(
                "{}: put less {} than expected: {:.9}/{:.9}",
                config.name,
                output.resource.name,
                desired,
                actual
            );
            report.discrepancies.push(report.transfers.len());
        }
        report.transfers.push(Transfer {
            resource: output.resource.name.clone(),
            desired,
            actual,
            direction: TransferDirection::Produced,
        });
    }

    report
}
