//! URL-resident game state: the value type, its move transition, and the codec.

mod codec;
mod error;
mod game_state;

pub use codec::{DEFAULT_ROUTE, HISTORY_SEPARATOR, StateCodec};
pub use error::StateError;
pub use game_state::{ArticleRef, GameState, SharePayload, is_valid_title};
