//! Investment Domain
//!
//! Contribution origination for the pension platform: how a requested amount
//! becomes items, how items are priced with the administration fee, and how
//! the investment and its payment move through their lifecycles.
//!
//! # Lifecycles
//!
//! ```text
//! Investment: CREATED -> REQUEST -> SUCCESS
//! Payment:    pending -> confirmed -> success | rejected
//!                     \-> expired
//! ```

pub mod fee;
pub mod investment;
pub mod item;
pub mod payment;
pub mod origination;
pub mod code;
pub mod error;

pub use fee::{split, FeeConfiguration, FeeSplit};
pub use investment::{Investment, InvestmentDetail, InvestmentSource, InvestmentStatus, Investor};
pub use item::InvestmentItem;
pub use payment::{InvestmentPayment, PaymentStatus};
pub use origination::{
    plan_company, plan_individual, Allocation, ContributionProfile, Holder, OriginationPlan,
    PlannedItem, ProductShare,
};
pub use code::{InvestmentCode, CODE_LENGTH, MAX_CODE_ATTEMPTS};
pub use error::InvestmentError;
