//! Request-scoped caller context

use uuid::Uuid;

use super::Role;

/// Who is calling, and inside which tenant.
///
/// Built once per request and passed explicitly to every service and
/// repository call. Every query filters on `tenant_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub roles: Vec<Role>,
}

impl RequestContext {
    pub fn new(tenant_id: Uuid, user_id: Uuid, roles: Vec<Role>) -> Self {
        Self {
            tenant_id,
            user_id,
            roles,
        }
    }
}
