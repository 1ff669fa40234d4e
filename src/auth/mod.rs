//! Device-flow login and per-network token storage.

pub mod device_code;
pub mod discovery;
pub mod error;
pub mod flow;
pub mod oidc;
pub mod store;
pub mod token;

pub use device_code::{DeviceCodePoll, DeviceCodeSession};
pub use error::AuthError;
pub use flow::{
    DeviceAuthorizer, DeviceAuthorizerFactory, DeviceFlowAuthenticator, DeviceFlowEvent,
    DeviceFlowEventSink, DeviceFlowState,
};
pub use store::{FileTokenStore, TokenStore, TokenStoreConfig};
pub use token::Token;
