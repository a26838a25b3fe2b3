//! Resource store abstraction and an in-memory implementation.
//!
//! Sign convention shared by both operations: a positive amount refers to
//! withdrawing stock, a negative amount to depositing into free space.
//! Results carry the same sign as the request and never exceed it in
//! magnitude.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::resources::{ResourceDefinition, ResourceId};

/// Everything the converter core needs from its environment's resource pool.
pub trait ResourceStore {
    /// Non-mutating probe. For `requested >= 0` returns how much of it could
    /// be withdrawn; for `requested < 0` returns (negated) how much of it
    /// could be deposited.
    fn available_for(&self, resource: &ResourceDefinition, requested: f64) -> f64;

    /// Move resources. Positive withdraws, negative deposits. Returns the
    /// amount actually moved, with the sign of the request.
    fn transfer(&mut self, resource: &ResourceDefinition, amount: f64) -> f64;
}

/// One resource's stock and storage limit. Capacity may be infinite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    pub amount: f64,
    pub capacity: f64,
}

impl Tank {
    pub fn new(amount: f64, capacity: f64) -> Self {
        let capacity = capacity.max(0.0);
        Self {
            amount: amount.clamp(0.0, capacity),
            capacity,
        }
    }

    /// Tank with no upper limit.
    pub fn unlimited(amount: f64) -> Self {
        Self::new(amount, f64::INFINITY)
    }

    pub fn free_space(&self) -> f64 {
        (self.capacity - self.amount).max(0.0)
    }
}

/// Vessel-wide resource pool keyed by resource ID.
///
/// A resource without a tank has neither stock nor space.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryStore {
    tanks: BTreeMap<ResourceId, Tank>,
    #[serde(skip)]
    transfers: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add capacity and stock for a resource. Tanks of the same resource pool
    /// together.
    pub fn add_tank(&mut self, resource: &ResourceDefinition, tank: Tank) {
        let entry = self.tanks.entry(resource.id).or_insert(Tank::new(0.0, 0.0));
        entry.capacity += tank.capacity;
        entry.amount += tank.amount;
    }

    pub fn with_tank(mut self, resource: &ResourceDefinition, tank: Tank) -> Self {
        self.add_tank(resource, tank);
        self
    }

    pub fn tank(&self, resource: &ResourceDefinition) -> Option<&Tank> {
        self.tanks.get(&resource.id)
    }

    /// Current stock of a resource (0 when there is no tank).
    pub fn amount(&self, resource: &ResourceDefinition) -> f64 {
        self.tank(resource).map(|t| t.amount).unwrap_or(0.0)
    }

    /// Number of mutating transfer calls made since creation or load.
    pub fn transfer_count(&self) -> usize {
        self.transfers
    }

    pub fn tanks(&self) -> impl Iterator<Item = (&ResourceId, &Tank)> {
        self.tanks.iter()
    }
}

impl ResourceStore for InMemoryStore {
    fn available_for(&self, resource: &ResourceDefinition, requested: f64) -> f64 {
        let Some(tank) = self.tanks.get(&resource.id) else {
            return 0.0;
        };
        if requested >= 0.0 {
            requested.min(tank.amount)
        } else {
            -(-requested).min(tank.free_space())
        }
    }

    fn transfer(&mut self, resource: &ResourceDefinition, amount: f64) -> f64 {
        self.transfers += 1;
        let Some(tank) = self.tanks.get_mut(&resource.id) else {
            return 0.0;
        };
        if amount >= 0.0 {
            let taken = amount.min(tank.amount);
            tank.amount -= taken;
            taken
        } else {
            let stored = (-amount).min(tank.free_space());
            tank.amount += stored;
            -stored
        }
    }
}
