//! v2 → v3 migration rows
//!
//! A [`MigrationPosition`] is one supplied or borrowed reserve as the
//! migration selector store sees it. [`describe`] turns it into a
//! [`MigrationRow`]: the checkbox, the asset, the balance and the before/after
//! pairs the list shows. Sections that only apply to some positions
//! (collateral change, APY type change) are `Option`s, so a row can never
//! show one without the data behind it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::format::{format_number, IncentiveInfo, RateCell, Unit, UNKNOWN_RATE};

/// Why a position cannot be selected for migration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MigrationDisabled {
    IsolationModeBorrowDisabled,
    EModeBorrowDisabled,
    V3AssetMissing,
    InsufficientLiquidity,
    AssetNotFlashloanable,
    ReserveFrozen,
    NotEnoughSupplies,
}

impl MigrationDisabled {
    pub fn reason(&self) -> &'static str {
        match self {
            MigrationDisabled::IsolationModeBorrowDisabled => {
                "Asset cannot be borrowed in isolation mode on v3"
            }
            MigrationDisabled::EModeBorrowDisabled => {
                "Asset is not borrowable in the selected E-Mode category"
            }
            MigrationDisabled::V3AssetMissing => "Asset is not listed on v3",
            MigrationDisabled::InsufficientLiquidity => "Not enough liquidity on v3",
            MigrationDisabled::AssetNotFlashloanable => "Asset cannot be flash loaned",
            MigrationDisabled::ReserveFrozen => "Reserve is frozen on v3",
            MigrationDisabled::NotEnoughSupplies => "Supplied collateral does not cover this borrow",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BorrowRateMode {
    Stable,
    Variable,
}

impl BorrowRateMode {
    pub fn label(&self) -> &'static str {
        match self {
            BorrowRateMode::Stable => "Stable",
            BorrowRateMode::Variable => "Variable",
        }
    }
}

/// The user's position on v2 together with the reserve's current rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReserve {
    pub symbol: String,
    pub icon_symbol: String,
    pub supply_apy: String,
    pub variable_borrow_apy: String,
    /// The user's own stable rate, not the reserve's
    pub stable_borrow_apy: String,
    #[serde(default)]
    pub a_incentives: Vec<IncentiveInfo>,
    #[serde(default)]
    pub v_incentives: Vec<IncentiveInfo>,
    #[serde(default)]
    pub s_incentives: Vec<IncentiveInfo>,
    #[serde(default)]
    pub usage_as_collateral_enabled_on_user: bool,
    #[serde(default)]
    pub usage_as_collateral_enabled: bool,
}

/// Rates the same asset would earn or pay on v3
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct V3Rates {
    #[serde(default)]
    pub supply_apy: Option<String>,
    #[serde(default)]
    pub variable_borrow_apy: Option<String>,
    #[serde(default)]
    pub a_incentives: Vec<IncentiveInfo>,
    #[serde(default)]
    pub v_incentives: Vec<IncentiveInfo>,
}

/// Present when the position can be enabled as collateral on v3
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralCapability {
    #[serde(default)]
    pub enabled_as_collateral: bool,
    #[serde(default)]
    pub is_isolated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationPosition {
    #[serde(default)]
    pub checked: bool,
    pub amount: String,
    pub amount_in_usd: String,
    #[serde(default)]
    pub disabled: Option<MigrationDisabled>,
    #[serde(default)]
    pub collateral: Option<CollateralCapability>,
    /// Set for borrow positions, absent for supplies
    #[serde(default)]
    pub borrow_rate_mode: Option<BorrowRateMode>,
    pub user_reserve: UserReserve,
    #[serde(default)]
    pub v3_rates: Option<V3Rates>,
}

impl MigrationPosition {
    pub fn is_borrow(&self) -> bool {
        self.borrow_rate_mode.is_some()
    }

    /// Identifies the same position across snapshot refreshes
    pub fn key(&self) -> (&str, Option<BorrowRateMode>) {
        (self.user_reserve.symbol.as_str(), self.borrow_rate_mode)
    }

    /// Current rate and incentives on v2
    pub fn v2_rate(&self) -> (&str, &[IncentiveInfo]) {
        let reserve = &self.user_reserve;
        let (apy, incentives) = match self.borrow_rate_mode {
            Some(BorrowRateMode::Stable) => (&reserve.stable_borrow_apy, &reserve.s_incentives),
            Some(BorrowRateMode::Variable) => (&reserve.variable_borrow_apy, &reserve.v_incentives),
            None => (&reserve.supply_apy, &reserve.a_incentives),
        };
        (apy.as_str(), incentives.as_slice())
    }

    /// Rate and incentives after migrating; borrows always land on the variable rate
    pub fn v3_rate(&self) -> (&str, &[IncentiveInfo]) {
        let Some(rates) = &self.v3_rates else {
            return (UNKNOWN_RATE, &[][..]);
        };
        let (apy, incentives) = if self.is_borrow() {
            (&rates.variable_borrow_apy, &rates.v_incentives)
        } else {
            (&rates.supply_apy, &rates.a_incentives)
        };
        let apy = apy.as_deref().filter(|s| !s.is_empty()).unwrap_or(UNKNOWN_RATE);
        (apy, incentives.as_slice())
    }
}

/// Keep the user's choices when fresh provider data replaces `previous`.
/// Positions that are new or became disabled keep what `next` says.
pub fn carry_selections(previous: &[MigrationPosition], next: &mut [MigrationPosition]) {
    let chosen: HashMap<_, _> = previous.iter().map(|p| (p.key(), p)).collect();

    for position in next.iter_mut() {
        let Some((old_checked, old_collateral)) = chosen.get(&position.key()).map(|old| (old.checked, old.collateral)) else {
            continue;
        };
        if position.disabled.is_none() {
            position.checked = old_checked;
        }
        if let (Some(capability), Some(old_capability)) = (position.collateral.as_mut(), old_collateral) {
            capability.enabled_as_collateral |= old_capability.enabled_as_collateral;
        }
    }
}

/// Interactions a row can hand back to its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowAction {
    ToggleSelection,
    EnableCollateral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Checkbox {
    pub checked: bool,
    pub disabled: bool,
}

impl Checkbox {
    /// A press on a disabled checkbox does nothing
    pub fn press(&self) -> Option<RowAction> {
        if self.disabled {
            None
        } else {
            Some(RowAction::ToggleSelection)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change<T> {
    pub from: T,
    pub to: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollateralIndicator {
    Enabled,
    Empty,
    /// Enabled, but only in isolation mode
    Isolated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Balance {
    pub amount: String,
    pub amount_in_usd: String,
}

/// Everything one migration list entry shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationRow {
    pub checkbox: Checkbox,
    pub symbol: String,
    pub icon_symbol: String,
    pub balance: Balance,
    pub apy_change: Change<RateCell>,
    pub collateral_change: Option<Change<CollateralIndicator>>,
    /// Source mode label → "Variable"
    pub apy_type_change: Option<Change<&'static str>>,
    pub disabled_reason: Option<&'static str>,
}

impl MigrationRow {
    pub fn press_checkbox(&self) -> Option<RowAction> {
        self.checkbox.press()
    }

    /// Only rows showing a collateral change offer the affordance
    pub fn press_enable_collateral(&self) -> Option<RowAction> {
        self.collateral_change
            .as_ref()
            .map(|_| RowAction::EnableCollateral)
    }
}

pub fn describe(position: &MigrationPosition) -> MigrationRow {
    let reserve = &position.user_reserve;

    let (v2_apy, v2_incentives) = position.v2_rate();
    let (v3_apy, v3_incentives) = position.v3_rate();

    let collateral_change = position.collateral.map(|capability| {
        let from = if reserve.usage_as_collateral_enabled_on_user && reserve.usage_as_collateral_enabled {
            CollateralIndicator::Enabled
        } else {
            CollateralIndicator::Empty
        };
        let to = if !capability.enabled_as_collateral {
            CollateralIndicator::Empty
        } else if capability.is_isolated {
            CollateralIndicator::Isolated
        } else {
            CollateralIndicator::Enabled
        };
        Change { from, to }
    });

    let apy_type_change = position.borrow_rate_mode.map(|mode| Change {
        from: mode.label(),
        to: BorrowRateMode::Variable.label(),
    });

    MigrationRow {
        checkbox: Checkbox {
            checked: position.checked,
            disabled: position.disabled.is_some(),
        },
        symbol: reserve.symbol.clone(),
        icon_symbol: reserve.icon_symbol.clone(),
        balance: Balance {
            amount: format_number(&position.amount, Unit::Token),
            amount_in_usd: format_number(&position.amount_in_usd, Unit::Usd),
        },
        apy_change: Change {
            from: RateCell::new(v2_apy, v2_incentives),
            to: RateCell::new(v3_apy, v3_incentives),
        },
        collateral_change,
        apy_type_change,
        disabled_reason: position.disabled.map(|d| d.reason()),
    }
}
