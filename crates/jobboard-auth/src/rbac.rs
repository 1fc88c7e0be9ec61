//! Role hierarchy predicates
//!
//! Pure functions over role strings. Both predicates are total over the
//! full string domain: a string that names no defined role carries level 0,
//! so malformed data can never make a check panic, only fail closed.

use jobboard_db::Role;
use std::str::FromStr;

/// Hierarchy level of a role string; 0 for anything not in the registry.
pub fn role_level(role: &str) -> u8 {
    Role::from_str(role).map(|r| r.level()).unwrap_or(0)
}

/// True iff `user_role` sits at or above `minimum_role` in the hierarchy.
///
/// Non-strict: every role satisfies itself as minimum.
pub fn has_minimum_role(user_role: &str, minimum_role: &str) -> bool {
    role_level(user_role) >= role_level(minimum_role)
}

/// True iff `manager_role` may administratively manage `target_role`.
///
/// ADMIN manages everything, itself included, regardless of numeric level.
/// Every other role manages only roles strictly below its own level: no
/// self-management and no peer-management. The strictness here is deliberate
/// and differs from [`has_minimum_role`].
pub fn can_manage_role(manager_role: &str, target_role: &str) -> bool {
    if manager_role == Role::Admin.as_str() {
        return true;
    }

    role_level(manager_role) > role_level(target_role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_minimum_role_reflexive() {
        for role in Role::ALL {
            assert!(has_minimum_role(role.as_str(), role.as_str()));
        }
    }

    #[test]
    fn test_has_minimum_role_follows_hierarchy() {
        for a in Role::ALL {
            for b in Role::ALL {
                if a.level() > b.level() {
                    assert!(has_minimum_role(a.as_str(), b.as_str()));
                    assert!(!has_minimum_role(b.as_str(), a.as_str()));
                }
            }
        }
    }

    #[test]
    fn test_admin_manages_everything() {
        for target in Role::ALL {
            assert!(can_manage_role("ADMIN", target.as_str()));
        }
        // Including unknown strings
        assert!(can_manage_role("ADMIN", "bogus"));
    }

    #[test]
    fn test_non_admin_management_is_strict() {
        for a in Role::ALL {
            if a.is_admin() {
                continue;
            }
            // No self-management, no peer-management
            assert!(!can_manage_role(a.as_str(), a.as_str()));
            for b in Role::ALL {
                assert_eq!(
                    can_manage_role(a.as_str(), b.as_str()),
                    a.level() > b.level()
                );
            }
        }
        assert!(can_manage_role("EMPLOYER", "JOB_SEEKER"));
        assert!(!can_manage_role("EMPLOYER", "ADMIN"));
        assert!(!can_manage_role("JOB_SEEKER", "JOB_SEEKER"));
    }

    #[test]
    fn test_unknown_roles_act_as_level_zero() {
        assert_eq!(role_level("bogus"), 0);
        assert_eq!(role_level(""), 0);
        // Case matters: the registry holds exact wire strings only
        assert_eq!(role_level("admin"), 0);

        assert!(!has_minimum_role("bogus", "JOB_SEEKER"));
        assert!(has_minimum_role("JOB_SEEKER", "bogus"));
        // Two unknowns tie at level 0, which satisfies the non-strict check
        assert!(has_minimum_role("bogus", "also-bogus"));

        assert!(can_manage_role("JOB_SEEKER", "bogus"));
        assert!(!can_manage_role("bogus", "bogus"));
    }
}
