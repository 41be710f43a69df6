//! Repository Invariant Tests
//!
//! - Ids stay unique under concurrent creates
//! - Mutations are visible to subsequent reads
//! - Missing ids never silently succeed

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use users_api::users::{
    InMemoryUserRepository, NewUser, Role, UserError, UserPatch, UserRepository,
};

/// Concurrent creates never hand out the same id.
#[test]
fn test_concurrent_creates_get_unique_ids() {
    let repo = Arc::new(InMemoryUserRepository::with_seed());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let repo = Arc::clone(&repo);
            thread::spawn(move || {
                (0..25)
                    .map(|i| {
                        repo.create(NewUser::new(
                            format!("user-{t}-{i}"),
                            format!("user{t}{i}@example.com"),
                            Role::Intern,
                        ))
                        .unwrap()
                        .id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let ids: Vec<_> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(unique.len(), 200);
    assert_eq!(*ids.iter().min().unwrap(), 6);
    assert_eq!(*ids.iter().max().unwrap(), 205);
    assert_eq!(repo.len().unwrap(), 205);
}

/// Concurrent updates and removals on disjoint ids all land.
#[test]
fn test_concurrent_mixed_mutations() {
    let repo = Arc::new(InMemoryUserRepository::with_seed());

    let updater = {
        let repo = Arc::clone(&repo);
        thread::spawn(move || {
            for _ in 0..100 {
                repo.update(1, UserPatch::default().with_role(Role::Admin))
                    .unwrap();
            }
        })
    };
    let remover = {
        let repo = Arc::clone(&repo);
        thread::spawn(move || repo.remove(5).unwrap())
    };

    updater.join().unwrap();
    let removed = remover.join().unwrap();

    assert_eq!(removed.name, "Chelsey Dietrich");
    assert_eq!(repo.get(1).unwrap().role, Role::Admin);
    assert_eq!(repo.get(5), Err(UserError::NotFound(5)));
}

/// New ids are one past the current maximum, not a running counter.
#[test]
fn test_ids_follow_current_max() {
    let repo = InMemoryUserRepository::with_seed();

    repo.remove(5).unwrap();
    let created = repo
        .create(NewUser::new("Ada", "ada@x.com", Role::Engineer))
        .unwrap();

    // 5 was the max and is gone, so max+1 lands on 5 again
    assert_eq!(created.id, 5);
    assert_eq!(repo.get(5).unwrap().name, "Ada");
}

/// Update and remove of a missing id fail instead of no-op.
#[test]
fn test_missing_ids_fail() {
    let repo = InMemoryUserRepository::with_seed();
    let before = repo.list(None).unwrap();

    assert!(repo.update(0, UserPatch::default()).unwrap_err().is_not_found());
    assert!(repo.remove(-1).unwrap_err().is_not_found());

    assert_eq!(repo.list(None).unwrap(), before);
}
