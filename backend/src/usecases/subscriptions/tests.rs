use super::*;
use std::sync::Mutex;

use async_trait::async_trait;
use mockall::predicate::eq;
use subdesk_core::{
    domain::{
        entities::{
            plans::{InsertPlanEntity, UpdatePlanEntity},
            subscriptions::SubscriptionEntity,
            users::InsertUserEntity,
        },
        repositories::{
            plans::MockPlanRepository, subscriptions::MockSubscriptionRepository,
            users::MockUserRepository,
        },
        value_objects::iam::{LoginModel, RegisterUserModel},
    },
    infra::security::argon2_hasher::Argon2PasswordHasher,
};

use crate::{
    auth::tokens::TokenKeys,
    usecases::{identity::IdentityUseCase, plans::MAX_DURATION_DAYS},
};

fn sample_user(id: Uuid) -> UserEntity {
    let now = Utc::now();
    UserEntity {
        id,
        name: "Ann".to_string(),
        email: "ann@example.com".to_string(),
        password_hash: "hashed".to_string(),
        role: "user".to_string(),
        created_at: now,
        updated_at: now,
    }
}

fn sample_plan(id: Uuid, duration_days: i32, is_active: bool) -> PlanEntity {
    let now = Utc::now();
    PlanEntity {
        id,
        name: "Monthly".to_string(),
        price: 9.99,
        duration_days,
        is_active,
        created_at: now,
        updated_at: now,
    }
}

fn stored(insert: InsertSubscriptionEntity) -> SubscriptionEntity {
    SubscriptionEntity {
        id: Uuid::new_v4(),
        user_id: insert.user_id,
        plan_id: insert.plan_id,
        start_date: insert.start_date,
        end_date: insert.end_date,
        status: insert.status,
        created_at: insert.start_date,
        updated_at: insert.start_date,
    }
}

fn sample_detail(status: SubscriptionStatus, end_date: DateTime<Utc>) -> SubscriptionDetail {
    let user = sample_user(Uuid::new_v4());
    let plan = sample_plan(Uuid::new_v4(), 30, true);
    let now = Utc::now();
    SubscriptionDetail {
        subscription: SubscriptionEntity {
            id: Uuid::new_v4(),
            user_id: user.id,
            plan_id: plan.id,
            start_date: end_date - Duration::days(30),
            end_date,
            status: status.to_string(),
            created_at: now,
            updated_at: now,
        },
        user: (&user).into(),
        plan: (&plan).into(),
    }
}

fn usecase(
    subscription_repository: MockSubscriptionRepository,
    plan_repository: MockPlanRepository,
    user_repository: MockUserRepository,
) -> SubscriptionUseCase<MockSubscriptionRepository, MockPlanRepository, MockUserRepository> {
    SubscriptionUseCase::new(
        Arc::new(subscription_repository),
        Arc::new(plan_repository),
        Arc::new(user_repository),
    )
}

fn insert_model(user_id: Uuid, plan_id: Uuid) -> InsertSubscriptionModel {
    InsertSubscriptionModel {
        user_id: Some(user_id.to_string()),
        plan_id: Some(plan_id.to_string()),
    }
}

#[tokio::test]
async fn create_spans_exactly_the_plan_duration() {
    let user_id = Uuid::new_v4();
    let plan_id = Uuid::new_v4();

    let mut user_repository = MockUserRepository::new();
    let mut plan_repository = MockPlanRepository::new();
    let mut subscription_repository = MockSubscriptionRepository::new();

    user_repository
        .expect_find_by_id()
        .with(eq(user_id))
        .returning(|id| Ok(Some(sample_user(id))));
    plan_repository
        .expect_find_by_id()
        .with(eq(plan_id))
        .returning(|id| Ok(Some(sample_plan(id, 30, true))));
    subscription_repository
        .expect_expire_lapsed()
        .withf(move |_, scoped| *scoped == Some(user_id))
        .returning(|_, _| Ok(0));
    subscription_repository
        .expect_find_active_for_user_plan()
        .with(eq(user_id), eq(plan_id))
        .returning(|_, _| Ok(None));
    subscription_repository
        .expect_create()
        .withf(|insert| insert.status == "active")
        .times(1)
        .returning(|insert| Ok(stored(insert)));

    let subscription = usecase(subscription_repository, plan_repository, user_repository)
        .create_subscription(insert_model(user_id, plan_id))
        .await
        .unwrap();

    assert_eq!(subscription.end_date - subscription.start_date, Duration::days(30));
    assert_eq!(subscription.status, SubscriptionStatus::Active);
    assert_eq!(subscription.user.id, user_id);
    assert_eq!(subscription.plan.id, plan_id);
    assert_eq!(subscription.plan.duration_days, 30);
}

#[tokio::test]
async fn create_handles_the_longest_plan_duration() {
    let user_id = Uuid::new_v4();
    let plan_id = Uuid::new_v4();

    let mut user_repository = MockUserRepository::new();
    let mut plan_repository = MockPlanRepository::new();
    let mut subscription_repository = MockSubscriptionRepository::new();

    user_repository
        .expect_find_by_id()
        .returning(|id| Ok(Some(sample_user(id))));
    plan_repository
        .expect_find_by_id()
        .returning(|id| Ok(Some(sample_plan(id, MAX_DURATION_DAYS, true))));
    subscription_repository
        .expect_expire_lapsed()
        .returning(|_, _| Ok(0));
    subscription_repository
        .expect_find_active_for_user_plan()
        .returning(|_, _| Ok(None));
    subscription_repository
        .expect_create()
        .times(1)
        .returning(|insert| Ok(stored(insert)));

    let subscription = usecase(subscription_repository, plan_repository, user_repository)
        .create_subscription(insert_model(user_id, plan_id))
        .await
        .unwrap();

    assert_eq!(
        subscription.end_date - subscription.start_date,
        Duration::days(i64::from(MAX_DURATION_DAYS))
    );
}

#[tokio::test]
async fn create_for_missing_user_inserts_nothing() {
    let mut user_repository = MockUserRepository::new();
    let mut plan_repository = MockPlanRepository::new();
    let mut subscription_repository = MockSubscriptionRepository::new();

    user_repository.expect_find_by_id().returning(|_| Ok(None));
    plan_repository.expect_find_by_id().never();
    subscription_repository.expect_create().never();

    let err = usecase(subscription_repository, plan_repository, user_repository)
        .create_subscription(insert_model(Uuid::new_v4(), Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(err, SubscriptionError::UserNotFound));
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_for_missing_plan_inserts_nothing() {
    let mut user_repository = MockUserRepository::new();
    let mut plan_repository = MockPlanRepository::new();
    let mut subscription_repository = MockSubscriptionRepository::new();

    user_repository
        .expect_find_by_id()
        .returning(|id| Ok(Some(sample_user(id))));
    plan_repository.expect_find_by_id().returning(|_| Ok(None));
    subscription_repository.expect_create().never();

    let err = usecase(subscription_repository, plan_repository, user_repository)
        .create_subscription(insert_model(Uuid::new_v4(), Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(err, SubscriptionError::PlanNotFound));
}

#[tokio::test]
async fn inactive_plan_is_unavailable() {
    let mut user_repository = MockUserRepository::new();
    let mut plan_repository = MockPlanRepository::new();
    let mut subscription_repository = MockSubscriptionRepository::new();

    user_repository
        .expect_find_by_id()
        .returning(|id| Ok(Some(sample_user(id))));
    plan_repository
        .expect_find_by_id()
        .returning(|id| Ok(Some(sample_plan(id, 30, false))));
    subscription_repository.expect_create().never();

    let err = usecase(subscription_repository, plan_repository, user_repository)
        .create_subscription(insert_model(Uuid::new_v4(), Uuid::new_v4()))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "PLAN_UNAVAILABLE");
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn second_create_while_active_conflicts() {
    let user_id = Uuid::new_v4();
    let plan_id = Uuid::new_v4();

    let mut user_repository = MockUserRepository::new();
    let mut plan_repository = MockPlanRepository::new();
    let mut subscription_repository = MockSubscriptionRepository::new();

    user_repository
        .expect_find_by_id()
        .returning(|id| Ok(Some(sample_user(id))));
    plan_repository
        .expect_find_by_id()
        .returning(|id| Ok(Some(sample_plan(id, 30, true))));
    subscription_repository
        .expect_expire_lapsed()
        .returning(|_, _| Ok(0));
    subscription_repository
        .expect_find_active_for_user_plan()
        .returning(|user_id, plan_id| {
            let now = Utc::now();
            Ok(Some(stored(InsertSubscriptionEntity {
                user_id,
                plan_id,
                start_date: now,
                end_date: now + Duration::days(30),
                status: "active".to_string(),
            })))
        });
    subscription_repository.expect_create().never();

    let err = usecase(subscription_repository, plan_repository, user_repository)
        .create_subscription(insert_model(user_id, plan_id))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "SUBSCRIPTION_ALREADY_ACTIVE");
    assert_eq!(err.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn unique_violation_on_insert_conflicts() {
    let mut user_repository = MockUserRepository::new();
    let mut plan_repository = MockPlanRepository::new();
    let mut subscription_repository = MockSubscriptionRepository::new();

    user_repository
        .expect_find_by_id()
        .returning(|id| Ok(Some(sample_user(id))));
    plan_repository
        .expect_find_by_id()
        .returning(|id| Ok(Some(sample_plan(id, 30, true))));
    subscription_repository
        .expect_expire_lapsed()
        .returning(|_, _| Ok(0));
    subscription_repository
        .expect_find_active_for_user_plan()
        .returning(|_, _| Ok(None));
    subscription_repository.expect_create().returning(|_| {
        Err(anyhow::Error::new(PersistenceConflict::Unique {
            constraint: "subscriptions_one_active_per_plan".to_string(),
        }))
    });

    let err = usecase(subscription_repository, plan_repository, user_repository)
        .create_subscription(insert_model(Uuid::new_v4(), Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(err, SubscriptionError::AlreadyActive));
}

#[tokio::test]
async fn create_reports_missing_and_malformed_ids() {
    let missing = usecase(
        MockSubscriptionRepository::new(),
        MockPlanRepository::new(),
        MockUserRepository::new(),
    )
    .create_subscription(InsertSubscriptionModel::default())
    .await
    .unwrap_err();
    match missing {
        SubscriptionError::Validation(validation) => {
            assert_eq!(validation.code, "MISSING_REQUIRED_FIELDS");
            assert_eq!(validation.missing_fields, vec!["userId", "planId"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let malformed = usecase(
        MockSubscriptionRepository::new(),
        MockPlanRepository::new(),
        MockUserRepository::new(),
    )
    .create_subscription(InsertSubscriptionModel {
        user_id: Some("not-a-uuid".to_string()),
        plan_id: Some(Uuid::new_v4().to_string()),
    })
    .await
    .unwrap_err();
    assert_eq!(malformed.code(), "INVALID_ID_FORMAT");
    assert_eq!(malformed.to_string(), "Invalid User ID format");
}

#[tokio::test]
async fn cancel_flips_active_to_cancel() {
    let detail = sample_detail(SubscriptionStatus::Active, Utc::now() + Duration::days(10));
    let subscription_id = detail.subscription.id;

    let mut subscription_repository = MockSubscriptionRepository::new();
    let found = detail.clone();
    subscription_repository
        .expect_find_by_id()
        .with(eq(subscription_id))
        .returning(move |_| Ok(Some(found.clone())));
    let cancelled = detail.subscription.clone();
    subscription_repository
        .expect_cancel()
        .with(eq(subscription_id))
        .times(1)
        .returning(move |_| {
            let mut row = cancelled.clone();
            row.status = "cancel".to_string();
            Ok(Some(row))
        });

    let subscription = usecase(
        subscription_repository,
        MockPlanRepository::new(),
        MockUserRepository::new(),
    )
    .cancel_subscription(&subscription_id.to_string())
    .await
    .unwrap();

    assert_eq!(subscription.status, SubscriptionStatus::Cancel);
    assert_eq!(subscription.user.id, detail.user.id);
}

#[tokio::test]
async fn second_cancel_writes_nothing() {
    let detail = sample_detail(SubscriptionStatus::Cancel, Utc::now() + Duration::days(10));
    let subscription_id = detail.subscription.id;

    let mut subscription_repository = MockSubscriptionRepository::new();
    subscription_repository
        .expect_find_by_id()
        .returning(move |_| Ok(Some(detail.clone())));
    subscription_repository.expect_cancel().never();

    let err = usecase(
        subscription_repository,
        MockPlanRepository::new(),
        MockUserRepository::new(),
    )
    .cancel_subscription(&subscription_id.to_string())
    .await
    .unwrap_err();

    assert_eq!(err.code(), "SUBSCRIPTION_ALREADY_CANCELLED");
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancel_of_missing_subscription_is_not_found() {
    let mut subscription_repository = MockSubscriptionRepository::new();
    subscription_repository
        .expect_find_by_id()
        .returning(|_| Ok(None));

    let err = usecase(
        subscription_repository,
        MockPlanRepository::new(),
        MockUserRepository::new(),
    )
    .cancel_subscription(&Uuid::new_v4().to_string())
    .await
    .unwrap_err();

    assert_eq!(err.code(), "SUBSCRIPTION_NOT_FOUND");
}

#[tokio::test]
async fn list_passes_filters_through() {
    let user_id = Uuid::new_v4();
    let cases = [
        (
            Some("active"),
            None,
            SubscriptionFilter {
                status: Some(SubscriptionStatus::Active),
                user_id: None,
            },
        ),
        (
            None,
            Some(user_id),
            SubscriptionFilter {
                status: None,
                user_id: Some(user_id),
            },
        ),
        (
            Some("cancel"),
            Some(user_id),
            SubscriptionFilter {
                status: Some(SubscriptionStatus::Cancel),
                user_id: Some(user_id),
            },
        ),
        (None, None, SubscriptionFilter::default()),
    ];

    for (status, user, expected) in cases {
        let expected_scope = expected.user_id;
        let mut subscription_repository = MockSubscriptionRepository::new();
        subscription_repository
            .expect_expire_lapsed()
            .withf(move |_, scoped| *scoped == expected_scope)
            .times(1)
            .returning(|_, _| Ok(0));
        subscription_repository
            .expect_list()
            .withf(move |filter| *filter == expected)
            .times(1)
            .returning(|_| {
                Ok(vec![sample_detail(
                    SubscriptionStatus::Active,
                    Utc::now() + Duration::days(1),
                )])
            });

        let listed = usecase(
            subscription_repository,
            MockPlanRepository::new(),
            MockUserRepository::new(),
        )
        .list_subscriptions(ListSubscriptionsQuery {
            status: status.map(str::to_string),
            user_id: user.map(|id| id.to_string()),
        })
        .await
        .unwrap();

        assert_eq!(listed.len(), 1);
    }
}

#[tokio::test]
async fn list_rejects_unknown_status_and_bad_user_id() {
    let mut subscription_repository = MockSubscriptionRepository::new();
    subscription_repository.expect_list().never();
    let usecase = usecase(
        subscription_repository,
        MockPlanRepository::new(),
        MockUserRepository::new(),
    );

    let bad_status = usecase
        .list_subscriptions(ListSubscriptionsQuery {
            status: Some("paused".to_string()),
            user_id: None,
        })
        .await
        .unwrap_err();
    assert_eq!(bad_status.code(), "VALIDATION_ERROR");

    let bad_user = usecase
        .list_subscriptions(ListSubscriptionsQuery {
            status: None,
            user_id: Some("123".to_string()),
        })
        .await
        .unwrap_err();
    assert_eq!(bad_user.code(), "INVALID_ID_FORMAT");
}

/// Serves `before` on the first read and `after` on every later one.
fn reads_changing_after_first(
    subscription_repository: &mut MockSubscriptionRepository,
    before: SubscriptionDetail,
    after: SubscriptionDetail,
) {
    let mut reads = 0usize;
    subscription_repository
        .expect_find_by_id()
        .returning(move |_| {
            reads += 1;
            if reads == 1 {
                Ok(Some(before.clone()))
            } else {
                Ok(Some(after.clone()))
            }
        });
}

#[tokio::test]
async fn get_reports_lapsed_subscription_as_expired() {
    let detail = sample_detail(SubscriptionStatus::Active, Utc::now() - Duration::days(1));
    let subscription_id = detail.subscription.id;
    let owner = detail.user.id;
    let mut flipped = detail.clone();
    flipped.subscription.status = SubscriptionStatus::Expired.to_string();

    let mut subscription_repository = MockSubscriptionRepository::new();
    reads_changing_after_first(&mut subscription_repository, detail, flipped);
    subscription_repository
        .expect_expire_lapsed()
        .withf(move |_, scoped| *scoped == Some(owner))
        .times(1)
        .returning(|_, _| Ok(1));

    let subscription = usecase(
        subscription_repository,
        MockPlanRepository::new(),
        MockUserRepository::new(),
    )
    .get_subscription(&subscription_id.to_string())
    .await
    .unwrap();

    assert_eq!(subscription.status, SubscriptionStatus::Expired);
}

#[tokio::test]
async fn get_of_lapsed_subscription_reports_a_concurrent_cancel() {
    let detail = sample_detail(SubscriptionStatus::Active, Utc::now() - Duration::days(1));
    let subscription_id = detail.subscription.id;
    let mut cancelled = detail.clone();
    cancelled.subscription.status = SubscriptionStatus::Cancel.to_string();

    let mut subscription_repository = MockSubscriptionRepository::new();
    reads_changing_after_first(&mut subscription_repository, detail, cancelled);
    subscription_repository
        .expect_expire_lapsed()
        .times(1)
        .returning(|_, _| Ok(0));

    let subscription = usecase(
        subscription_repository,
        MockPlanRepository::new(),
        MockUserRepository::new(),
    )
    .get_subscription(&subscription_id.to_string())
    .await
    .unwrap();

    assert_eq!(subscription.status, SubscriptionStatus::Cancel);
}

#[tokio::test]
async fn get_of_unexpired_subscription_skips_sweep() {
    let detail = sample_detail(SubscriptionStatus::Active, Utc::now() + Duration::days(5));
    let subscription_id = detail.subscription.id;

    let mut subscription_repository = MockSubscriptionRepository::new();
    subscription_repository
        .expect_find_by_id()
        .returning(move |_| Ok(Some(detail.clone())));
    subscription_repository.expect_expire_lapsed().never();

    let subscription = usecase(
        subscription_repository,
        MockPlanRepository::new(),
        MockUserRepository::new(),
    )
    .get_subscription(&subscription_id.to_string())
    .await
    .unwrap();

    assert_eq!(subscription.status, SubscriptionStatus::Active);
}

#[tokio::test]
async fn sweep_expires_across_all_users() {
    let mut subscription_repository = MockSubscriptionRepository::new();
    subscription_repository
        .expect_expire_lapsed()
        .withf(|_, scoped| scoped.is_none())
        .returning(|_, _| Ok(3));

    let expired = usecase(
        subscription_repository,
        MockPlanRepository::new(),
        MockUserRepository::new(),
    )
    .sweep_lapsed()
    .await
    .unwrap();

    assert_eq!(expired, 3);
}

/// Shared store backing the scenario test.
#[derive(Default)]
struct InMemoryStore {
    users: Mutex<Vec<UserEntity>>,
    plans: Mutex<Vec<PlanEntity>>,
    subscriptions: Mutex<Vec<SubscriptionEntity>>,
}

impl InMemoryStore {
    fn detail(&self, subscription: SubscriptionEntity) -> Option<SubscriptionDetail> {
        let users = self.users.lock().unwrap();
        let plans = self.plans.lock().unwrap();
        let user = users.iter().find(|user| user.id == subscription.user_id)?;
        let plan = plans.iter().find(|plan| plan.id == subscription.plan_id)?;
        Some(SubscriptionDetail {
            user: user.into(),
            plan: plan.into(),
            subscription,
        })
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, user_id: Uuid) -> anyhow::Result<Option<UserEntity>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserEntity>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, insert: InsertUserEntity) -> anyhow::Result<UserEntity> {
        let now = Utc::now();
        let user = UserEntity {
            id: Uuid::new_v4(),
            name: insert.name,
            email: insert.email,
            password_hash: insert.password_hash,
            role: insert.role,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl PlanRepository for InMemoryStore {
    async fn list_plans(&self) -> anyhow::Result<Vec<PlanEntity>> {
        Ok(self.plans.lock().unwrap().clone())
    }

    async fn find_by_id(&self, plan_id: Uuid) -> anyhow::Result<Option<PlanEntity>> {
        Ok(self.plans.lock().unwrap().iter().find(|p| p.id == plan_id).cloned())
    }

    async fn create(&self, insert: InsertPlanEntity) -> anyhow::Result<PlanEntity> {
        let mut plan = sample_plan(Uuid::new_v4(), insert.duration_days, insert.is_active);
        plan.name = insert.name;
        plan.price = insert.price;
        self.plans.lock().unwrap().push(plan.clone());
        Ok(plan)
    }

    async fn update(&self, _: Uuid, _: UpdatePlanEntity) -> anyhow::Result<Option<PlanEntity>> {
        Ok(None)
    }

    async fn delete(&self, _: Uuid) -> anyhow::Result<bool> {
        Ok(false)
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryStore {
    async fn find_by_id(&self, subscription_id: Uuid) -> anyhow::Result<Option<SubscriptionDetail>> {
        let row = self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == subscription_id)
            .cloned();
        Ok(row.and_then(|row| self.detail(row)))
    }

    async fn find_active_for_user_plan(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
    ) -> anyhow::Result<Option<SubscriptionEntity>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.user_id == user_id && s.plan_id == plan_id && s.status == "active")
            .cloned())
    }

    async fn create(&self, insert: InsertSubscriptionEntity) -> anyhow::Result<SubscriptionEntity> {
        let row = stored(insert);
        self.subscriptions.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn list(&self, _: SubscriptionFilter) -> anyhow::Result<Vec<SubscriptionDetail>> {
        let rows = self.subscriptions.lock().unwrap().clone();
        Ok(rows.into_iter().filter_map(|row| self.detail(row)).collect())
    }

    async fn cancel(&self, subscription_id: Uuid) -> anyhow::Result<Option<SubscriptionEntity>> {
        let mut rows = self.subscriptions.lock().unwrap();
        Ok(rows
            .iter_mut()
            .find(|s| s.id == subscription_id && s.status != "cancel")
            .map(|row| {
                row.status = "cancel".to_string();
                row.updated_at = Utc::now();
                row.clone()
            }))
    }

    async fn expire_lapsed(&self, now: DateTime<Utc>, user_id: Option<Uuid>) -> anyhow::Result<usize> {
        let mut rows = self.subscriptions.lock().unwrap();
        let mut expired = 0;
        for row in rows.iter_mut().filter(|s| {
            s.status == "active" && s.end_date < now && user_id.is_none_or(|id| id == s.user_id)
        }) {
            row.status = "expired".to_string();
            expired += 1;
        }
        Ok(expired)
    }
}

#[tokio::test]
async fn register_login_subscribe_cancel_scenario() {
    let store = Arc::new(InMemoryStore::default());
    let token_keys = Arc::new(TokenKeys::new("supersecretjwtsecretforunittesting123", 7));
    let identity = IdentityUseCase::new(
        Arc::clone(&store),
        Arc::new(Argon2PasswordHasher::new()),
        Arc::clone(&token_keys),
    );
    let ledger = SubscriptionUseCase::new(Arc::clone(&store), Arc::clone(&store), Arc::clone(&store));

    let ann = identity
        .register(RegisterUserModel {
            name: Some("Ann".to_string()),
            email: Some("ann@example.com".to_string()),
            password: Some("secret1".to_string()),
        })
        .await
        .unwrap();
    let serialized = serde_json::to_value(&ann).unwrap();
    assert!(serialized.get("password").is_none());
    assert!(serialized.get("passwordHash").is_none());

    let login = identity
        .login(LoginModel {
            email: Some("ann@example.com".to_string()),
            password: Some("secret1".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(login.user.role.to_string(), "user");
    assert_eq!(token_keys.verify(&login.token).unwrap().sub, ann.id.to_string());

    let plan = PlanRepository::create(
        store.as_ref(),
        InsertPlanEntity {
            name: "Monthly".to_string(),
            price: 9.99,
            duration_days: 30,
            is_active: true,
        },
    )
    .await
    .unwrap();

    let subscription = ledger
        .create_subscription(insert_model(ann.id, plan.id))
        .await
        .unwrap();
    assert_eq!(subscription.end_date - subscription.start_date, Duration::days(30));

    let cancelled = ledger
        .cancel_subscription(&subscription.id.to_string())
        .await
        .unwrap();
    assert_eq!(cancelled.status, SubscriptionStatus::Cancel);

    let again = ledger
        .cancel_subscription(&subscription.id.to_string())
        .await
        .unwrap_err();
    assert_eq!(again.to_string(), "Subscription is already cancelled");
    assert_eq!(again.status_code(), StatusCode::BAD_REQUEST);
}
