//! Domain - ドメインモデル（ids, advert, events, errors）

pub mod advert;
pub mod errors;
pub mod events;
pub mod ids;

pub use advert::{Advert, AdvertStatus, ConfirmOutcome, NewAdvert};
pub use errors::{ErrorKind, LifecycleError, PublishError, StoreError, ValidationError};
pub use events::AdvertConfirmed;
pub use ids::{AdvertId, ParseAdvertIdError};
