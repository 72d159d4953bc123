//! Party Reference Domain
//!
//! Read-mostly records the investment core consumes: the companies running
//! bulk programs, customers and participants with their configured
//! contributions, benefit participation requests and support tickets. Each
//! registration is gated by an approval.

pub mod company;
pub mod customer;
pub mod participant;
pub mod benefit;
pub mod ticket;
pub mod status;
pub mod error;

pub use company::{Company, DistributionShare};
pub use customer::Customer;
pub use participant::{Contribution, Participant};
pub use benefit::BenefitParticipation;
pub use ticket::{Ticket, TicketStatus};
pub use status::RegistrationStatus;
pub use error::PartyError;
