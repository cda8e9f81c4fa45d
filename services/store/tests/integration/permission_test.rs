use atelier_domain::access::Permission;
use atelier_domain::user::Role;
use atelier_store::usecase::permission::PermissionResolver;

use crate::helpers::{MockAccessRepo, test_user};

fn perm(code: &str) -> Permission {
    Permission::new(code)
}

#[tokio::test]
async fn should_grant_admin_every_seeded_permission() {
    let admin = test_user(1, Role::Admin, true);
    let resolver = PermissionResolver {
        access: MockAccessRepo::for_users(std::slice::from_ref(&admin)),
    };

    for code in [
        Permission::BRANDS_READ,
        Permission::BRANDS_WRITE,
        Permission::CLOTHES_READ,
        Permission::CLOTHES_WRITE,
        Permission::CARTS_READ,
    ] {
        assert!(resolver.has_permission(&admin, &perm(code)).await, "{code}");
    }
}

#[tokio::test]
async fn should_grant_user_only_read_permissions() {
    let user = test_user(2, Role::User, true);
    let resolver = PermissionResolver {
        access: MockAccessRepo::for_users(std::slice::from_ref(&user)),
    };

    assert!(resolver.has_permission(&user, &perm(Permission::BRANDS_READ)).await);
    assert!(resolver.has_permission(&user, &perm(Permission::CLOTHES_READ)).await);
    assert!(!resolver.has_permission(&user, &perm(Permission::BRANDS_WRITE)).await);
    assert!(!resolver.has_permission(&user, &perm(Permission::CARTS_READ)).await);
    assert!(!resolver.has_permission(&user, &perm("unknown:code")).await);
}

#[tokio::test]
async fn should_deny_everything_to_role_without_mapped_permissions() {
    let user = test_user(2, Role::User, true);
    let resolver = PermissionResolver {
        access: MockAccessRepo::for_users(std::slice::from_ref(&user)).with_grants(vec![(
            Role::Admin,
            perm(Permission::BRANDS_READ),
        )]),
    };

    assert!(!resolver.has_permission(&user, &perm(Permission::BRANDS_READ)).await);
}

#[tokio::test]
async fn should_match_role_by_exact_name() {
    let admin = test_user(1, Role::Admin, true);
    let user = test_user(2, Role::User, true);
    let resolver = PermissionResolver {
        access: MockAccessRepo::for_users(&[admin.clone(), user.clone()]),
    };

    assert!(resolver.has_role(&admin, Role::Admin).await);
    assert!(!resolver.has_role(&user, Role::Admin).await);
    assert!(resolver.has_role(&user, Role::User).await);
    // Roles are flat: ADMIN does not imply USER.
    assert!(!resolver.has_role(&admin, Role::User).await);
}

#[tokio::test]
async fn should_read_role_from_store_not_from_loaded_user() {
    let mut stale = test_user(1, Role::Admin, true);
    let resolver = PermissionResolver {
        access: MockAccessRepo::for_users(std::slice::from_ref(&stale)),
    };
    stale.role = Role::User;

    assert!(resolver.has_role(&stale, Role::Admin).await);
}

#[tokio::test]
async fn should_fail_closed_when_store_is_down() {
    let admin = test_user(1, Role::Admin, true);
    let resolver = PermissionResolver {
        access: MockAccessRepo::for_users(std::slice::from_ref(&admin)).failing(),
    };

    assert!(!resolver.has_role(&admin, Role::Admin).await);
    assert!(!resolver.has_permission(&admin, &perm(Permission::BRANDS_READ)).await);
}

#[tokio::test]
async fn should_deny_user_missing_from_store() {
    let ghost = test_user(99, Role::Admin, true);
    let resolver = PermissionResolver {
        access: MockAccessRepo::for_users(&[]),
    };

    assert!(!resolver.has_role(&ghost, Role::Admin).await);
    assert!(!resolver.has_permission(&ghost, &perm(Permission::BRANDS_READ)).await);
}
