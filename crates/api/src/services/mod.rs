//! Service-layer integrations: token minting and the identity collaborator.

pub mod auth;
pub mod google;
