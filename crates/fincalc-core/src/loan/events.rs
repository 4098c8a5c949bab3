use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive};
use crate::types::{Money, Percent};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// What a prepayment does to the remaining installments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepaymentPolicy {
    /// Keep the EMI; the loan closes earlier.
    #[default]
    ReduceTenure,
    /// Recompute a smaller EMI for the same horizon.
    ReduceEmi,
}

/// One-time extra payment against principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prepayment {
    pub amount: Money,
    pub effective_date: NaiveDate,
    #[serde(default)]
    pub policy: PrepaymentPolicy,
}

/// Scheduled change of the annual interest rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateChange {
    pub new_annual_rate: Percent,
    pub effective_date: NaiveDate,
}

/// Scheduled override of the installment amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmiChange {
    pub new_emi_amount: Money,
    pub effective_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Prepayment,
    RateChange,
    EmiChange,
}

/// Any dated event that can alter an amortization mid-stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduledEvent {
    Prepayment(Prepayment),
    RateChange(RateChange),
    EmiChange(EmiChange),
}

impl ScheduledEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ScheduledEvent::Prepayment(_) => EventKind::Prepayment,
            ScheduledEvent::RateChange(_) => EventKind::RateChange,
            ScheduledEvent::EmiChange(_) => EventKind::EmiChange,
        }
    }

    pub fn effective_date(&self) -> NaiveDate {
        match self {
            ScheduledEvent::Prepayment(p) => p.effective_date,
            ScheduledEvent::RateChange(c) => c.effective_date,
            ScheduledEvent::EmiChange(c) => c.effective_date,
        }
    }

    pub fn validate(&self) -> FinCalcResult<()> {
        match self {
            ScheduledEvent::Prepayment(p) => ensure_positive("prepayment.amount", p.amount),
            ScheduledEvent::RateChange(c) => {
                ensure_non_negative("rate_change.new_annual_rate", c.new_annual_rate)
            }
            ScheduledEvent::EmiChange(c) => ensure_positive("emi_change.new_emi_amount", c.new_emi_amount),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ScheduledEvent::Prepayment(p) => {
                format!("Prepayment of {} dated {}", p.amount, p.effective_date)
            }
            ScheduledEvent::RateChange(c) => {
                format!("Rate change to {}% dated {}", c.new_annual_rate, c.effective_date)
            }
            ScheduledEvent::EmiChange(c) => {
                format!("EMI change to {} dated {}", c.new_emi_amount, c.effective_date)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Per-run event book
// ---------------------------------------------------------------------------

/// Copy of the caller's events plus a consumed set that lives only as long as
/// one simulation run.
#[derive(Debug)]
pub struct EventBook {
    events: Vec<ScheduledEvent>,
    consumed: Vec<bool>,
}

impl EventBook {
    pub fn new(
        prepayments: &[Prepayment],
        rate_changes: &[RateChange],
        emi_changes: &[EmiChange],
    ) -> FinCalcResult<Self> {
        let events: Vec<ScheduledEvent> = prepayments
            .iter()
            .cloned()
            .map(ScheduledEvent::Prepayment)
            .chain(rate_changes.iter().cloned().map(ScheduledEvent::RateChange))
            .chain(emi_changes.iter().cloned().map(ScheduledEvent::EmiChange))
            .collect();
        Self::from_events(events)
    }

    pub fn from_events(events: Vec<ScheduledEvent>) -> FinCalcResult<Self> {
        for event in &events {
            event.validate()?;
        }
        let consumed = vec![false; events.len()];
        Ok(Self { events, consumed })
    }

    /// Consume the unconsumed event of `kind` with the latest effective date
    /// on or before `as_of`.
    ///
    /// Only one event per call is taken. Earlier-dated events of the same
    /// kind that were also due stay unconsumed and are eligible on later
    /// calls. Equal dates resolve to the event supplied last.
    pub fn take_latest_due(&mut self, kind: EventKind, as_of: NaiveDate) -> Option<&ScheduledEvent> {
        let index = self
            .events
            .iter()
            .enumerate()
            .filter(|(i, e)| !self.consumed[*i] && e.kind() == kind && e.effective_date() <= as_of)
            .max_by_key(|(i, e)| (e.effective_date(), *i))
            .map(|(i, _)| i)?;
        self.consumed[index] = true;
        Some(&self.events[index])
    }

    /// Events that were never applied during the run.
    pub fn unconsumed(&self) -> impl Iterator<Item = &ScheduledEvent> {
        self.events
            .iter()
            .zip(&self.consumed)
            .filter(|(_, used)| !**used)
            .map(|(e, _)| e)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
