//! Permission Definitions
//!
//! Role based permissions.
//!
//! ## 设计原则
//! - `superAdmin` / `admin` 拥有所有权限
//! - `manager` 管理菜单、桌台、库存和订单
//! - `staff` 只能操作订单

use shared::models::UserRole;

/// Menu management (categories, items, tags)
pub const MENU_MANAGE: &str = "menu:manage";
/// Floor management (sections, tables, waiters, groups)
pub const TABLES_MANAGE: &str = "tables:manage";
/// Inventory management (vendors, IVM orders, spoilage)
pub const INVENTORY_MANAGE: &str = "inventory:manage";
/// Order operations (place, clear, cancel, delete)
pub const ORDERS_MANAGE: &str = "orders:manage";
/// Tenant settings (restaurant profile)
pub const SETTINGS_MANAGE: &str = "settings:manage";

/// All configurable permissions
pub const ALL_PERMISSIONS: &[&str] = &[
    MENU_MANAGE,
    TABLES_MANAGE,
    INVENTORY_MANAGE,
    ORDERS_MANAGE,
    SETTINGS_MANAGE,
];

/// 经理角色默认权限
pub const DEFAULT_MANAGER_PERMISSIONS: &[&str] =
    &[MENU_MANAGE, TABLES_MANAGE, INVENTORY_MANAGE, ORDERS_MANAGE];

/// 普通员工默认权限
pub const DEFAULT_STAFF_PERMISSIONS: &[&str] = &[ORDERS_MANAGE];

/// Permissions granted to a role
pub fn role_permissions(role: UserRole) -> &'static [&'static str] {
    match role {
        UserRole::SuperAdmin | UserRole::Admin => ALL_PERMISSIONS,
        UserRole::Manager => DEFAULT_MANAGER_PERMISSIONS,
        UserRole::Staff => DEFAULT_STAFF_PERMISSIONS,
    }
}

/// Whether `role` carries `permission`
pub fn role_has_permission(role: UserRole, permission: &str) -> bool {
    role_permissions(role).contains(&permission)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_has_everything() {
        for p in ALL_PERMISSIONS {
            assert!(role_has_permission(UserRole::Admin, p));
            assert!(role_has_permission(UserRole::SuperAdmin, p));
        }
    }

    #[test]
    fn test_manager_cannot_edit_settings() {
        assert!(role_has_permission(UserRole::Manager, INVENTORY_MANAGE));
        assert!(!role_has_permission(UserRole::Manager, SETTINGS_MANAGE));
    }

    #[test]
    fn test_staff_only_orders() {
        assert!(role_has_permission(UserRole::Staff, ORDERS_MANAGE));
        assert!(!role_has_permission(UserRole::Staff, MENU_MANAGE));
        assert!(!role_has_permission(UserRole::Staff, TABLES_MANAGE));
    }

    #[test]
    fn test_unknown_permission_is_denied() {
        assert!(!role_has_permission(UserRole::Admin, "orders:void"));
    }
}
