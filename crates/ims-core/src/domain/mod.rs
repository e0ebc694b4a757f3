pub mod draft;
pub mod ids;
pub mod interaction;
pub mod site;

pub use draft::InteractionDraft;
pub use ids::{InteractionId, SiteId, UserId};
pub use interaction::{Interaction, InteractionType};
pub use site::Site;
