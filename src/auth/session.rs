//! Local login once a shop's access token is known.
//!
//! Mapping a `(shop, access token)` pair to a local principal is policy
//! owned by an [`IdentityBackend`]; starting the browser session is owned
//! by a [`LoginSession`]. [`establish_session`] only ties the two together.
//!
//! A backend that resolves nothing is not an error: the handshake still
//! completes and the request stays anonymous.

use crate::config::ShopDomain;
use crate::handshake::HandshakeRequest;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// A locally authenticated identity bound to a shop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    /// Stable identifier of the local principal.
    pub id: String,
    /// The shop the principal acts for.
    pub shop: ShopDomain,
}

/// Resolves a shop and its access token to a local principal.
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    /// Returns the principal for `shop`, creating one if the backend's
    /// policy allows, or `None` if no principal can be resolved.
    async fn resolve(&self, shop: &ShopDomain, access_token: &str) -> Option<Principal>;
}

/// The web framework's login-session mechanism.
#[async_trait]
pub trait LoginSession: Send + Sync {
    /// Marks the browser session behind `request` as logged in as `principal`.
    async fn start(&self, request: &HandshakeRequest, principal: &Principal);
}

/// Resolves the principal for a freshly exchanged token and logs it in.
///
/// Returns the principal that was logged in, or `None` if the backend
/// resolved nothing, in which case no session is started.
pub async fn establish_session(
    identity: &dyn IdentityBackend,
    login: &dyn LoginSession,
    request: &HandshakeRequest,
    shop: &ShopDomain,
    access_token: &str,
) -> Option<Principal> {
    let Some(principal) = identity.resolve(shop, access_token).await else {
        tracing::debug!(shop = %shop, "No principal resolved; request stays anonymous");
        return None;
    };

    login.start(request, &principal).await;
    tracing::info!(shop = %shop, principal = %principal.id, "Shop user logged in");

    Some(principal)
}

/// A shop user known to [`ShopUserBackend`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShopUser {
    /// The principal this user logs in as.
    pub principal: Principal,
    /// The most recent access token granted for the shop.
    pub access_token: String,
}

/// In-memory identity backend with one user per shop.
///
/// Unknown shops get a user on first login; known shops have their stored
/// token replaced by the new one. The principal id is the shop domain.
/// Empty tokens resolve to nothing.
#[derive(Debug, Default)]
pub struct ShopUserBackend {
    users: RwLock<HashMap<ShopDomain, ShopUser>>,
}

impl ShopUserBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored user for `shop`, if any.
    #[must_use]
    pub fn get(&self, shop: &ShopDomain) -> Option<ShopUser> {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(shop)
            .cloned()
    }

    /// Returns the number of known shops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no shop has logged in yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IdentityBackend for ShopUserBackend {
    async fn resolve(&self, shop: &ShopDomain, access_token: &str) -> Option<Principal> {
        if access_token.is_empty() {
            return None;
        }

        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        let user = users.entry(shop.clone()).or_insert_with(|| {
            tracing::info!(shop = %shop, "Creating shop user");
            ShopUser {
                principal: Principal {
                    id: shop.to_string(),
                    shop: shop.clone(),
                },
                access_token: String::new(),
            }
        });
        user.access_token = access_token.to_string();

        Some(user.principal.clone())
    }
}
