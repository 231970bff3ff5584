pub use accounts::{Account, AccountKind, AccountSummary};
pub use commands::{NewAccountCmd, NewOrganization, NewPaymentMethodCmd, OrderCmd, RemoteUser};
pub use currency::Currency;
pub use entries::{EntryKind, EntryPair, LedgerEntry};
pub use error::EngineError;
pub use fees::{FeeBreakdown, net_amount_minor};
pub use fx::{FixedRateProvider, FxService, RateProvider};
pub use memberships::MembershipRole;
pub use ops::{Engine, EngineBuilder};
pub use orders::{Order, OrderCreated, OrderStatus};
pub use payment_methods::{PaymentMethod, PaymentMethodService};

pub mod accounts;
mod commands;
mod currency;
pub mod entries;
mod error;
mod fees;
mod fx;
pub mod memberships;
mod money;
mod ops;
pub mod orders;
pub mod payment_methods;
pub mod users;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
