//! End-to-end flow: settings, labels, then queries from masked and unmasked roles.

use anon_core::{AnonConfig, ConfigKey, ObjectRef, PolicyName, Principal, RoleId};
use anon_policy::{InMemoryLabelStore, LabelError, LabelStore, SecurityLabelCommand};
use anon_runtime::{InMemorySchemaCatalog, MaskingExtension, RuntimeError, Session};
use anon_sql::CommandKind;
use std::sync::Arc;

const ADMIN: RoleId = RoleId(10);
const ANALYST: RoleId = RoleId(16390);
const AUDITOR: RoleId = RoleId(16391);
const ANON_SCHEMA: u32 = 16500;
const PUBLIC_SCHEMA: u32 = 2200;

fn admin() -> Principal {
    Principal::superuser(ADMIN)
}

fn policy(name: &str) -> PolicyName {
    PolicyName::new(name).unwrap()
}

fn label(policy_name: &str, object: ObjectRef, text: &str) -> SecurityLabelCommand {
    SecurityLabelCommand::new(policy(policy_name), object, Some(text))
}

fn setup() -> (MaskingExtension, Arc<InMemoryLabelStore>) {
    let config = AnonConfig::from_yaml(
        r#"
masking_policies: "anon,gdpr"
transparent_dynamic_masking: true
restrict_to_trusted_schemas: true
"#,
    )
    .unwrap();

    let mut catalog = InMemorySchemaCatalog::new();
    catalog.insert("anon", ANON_SCHEMA);
    catalog.insert("public", PUBLIC_SCHEMA);

    let store = Arc::new(InMemoryLabelStore::new());
    let ext = MaskingExtension::new(config, store.clone(), Arc::new(catalog));
    (ext, store)
}

#[test]
fn masking_functions_must_come_from_trusted_schemas() {
    let (ext, store) = setup();
    let email = ObjectRef::column(16402, 3);

    let err = ext
        .security_label(
            &label("anon", email, "MASKED WITH FUNCTION anon.fake_email()"),
            &admin(),
        )
        .unwrap_err();
    assert!(matches!(err, RuntimeError::UntrustedFunction { .. }));
    assert!(store.is_empty());

    // only a superuser may trust a schema
    let trust = label("anon", ObjectRef::schema(ANON_SCHEMA), "TRUSTED");
    let err = ext
        .security_label(&trust, &Principal::new(ANALYST))
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Label(LabelError::InsufficientPrivilege)
    ));
    ext.security_label(&trust, &admin()).unwrap();

    ext.security_label(
        &label("anon", email, "MASKED WITH FUNCTION anon.fake_email()"),
        &admin(),
    )
    .unwrap();
    assert_eq!(
        store.get_label(&email, &policy("anon")).as_deref(),
        Some("MASKED WITH FUNCTION anon.fake_email()")
    );

    let err = ext
        .security_label(
            &label("anon", email, "MASKED WITH FUNCTION public.md5(email)"),
            &admin(),
        )
        .unwrap_err();
    assert!(matches!(err, RuntimeError::UntrustedFunction { .. }));
}

#[test]
fn init_trusts_the_anon_schema_for_every_policy() {
    let (ext, store) = setup();
    let email = ObjectRef::column(16402, 3);

    assert!(matches!(
        ext.init_masking_policies(&Principal::new(ANALYST)),
        Err(RuntimeError::Label(LabelError::InsufficientPrivilege))
    ));
    assert!(store.is_empty());

    assert!(ext.init_masking_policies(&admin()).unwrap());
    for name in ["anon", "gdpr"] {
        assert_eq!(
            store
                .get_label(&ObjectRef::schema(ANON_SCHEMA), &policy(name))
                .as_deref(),
            Some("TRUSTED")
        );
        ext.security_label(
            &label(name, email, "MASKED WITH FUNCTION anon.fake_email()"),
            &admin(),
        )
        .unwrap();
    }
    assert!(
        store
            .get_label(&ObjectRef::schema(PUBLIC_SCHEMA), &policy("anon"))
            .is_none()
    );
}

#[test]
fn init_needs_the_anon_schema() {
    let store = Arc::new(InMemoryLabelStore::new());
    let ext = MaskingExtension::new(
        AnonConfig::default(),
        store,
        Arc::new(InMemorySchemaCatalog::new()),
    );
    let err = ext.init_masking_policies(&admin()).unwrap_err();
    assert_eq!(err.sqlstate(), "3F000");
}

#[test]
fn extra_clauses_cannot_ride_along_a_trusted_call() {
    let (ext, store) = setup();
    ext.init_masking_policies(&admin()).unwrap();
    let before = store.len();

    let err = ext
        .security_label(
            &label(
                "anon",
                ObjectRef::column(16402, 3),
                "MASKED WITH FUNCTION anon.fake_email() FROM public.evil() WHERE public.drop_all() IS NULL",
            ),
            &admin(),
        )
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Sql(_)));
    assert_eq!(store.len(), before);
}

#[test]
fn masked_role_queries_are_rejected() {
    let (ext, _store) = setup();

    // exempt the auditor from both policies
    for name in ["anon", "gdpr"] {
        ext.security_label(&label(name, ObjectRef::role(AUDITOR.0), "MASKED"), &admin())
            .unwrap();
    }

    let auditor = Session::new(Principal::new(AUDITOR));
    let queries = ext.analyze(&auditor, "SELECT * FROM people").unwrap();
    assert_eq!(queries[0].command, CommandKind::Select);
    assert_eq!(ext.get_masking_policy(None, &auditor), None);

    let analyst = Session::new(Principal::new(ANALYST));
    assert_eq!(
        ext.get_masking_policy(None, &analyst),
        Some("anon".to_string())
    );
    assert!(matches!(
        ext.analyze(&analyst, "SELECT * FROM people"),
        Err(RuntimeError::MaskingRewriteUnimplemented { .. })
    ));
    assert!(matches!(
        ext.analyze(&analyst, "EXPLAIN SELECT * FROM people"),
        Err(RuntimeError::RoleIsMasked { .. })
    ));
    assert!(matches!(
        ext.analyze(&analyst, "TRUNCATE people"),
        Err(RuntimeError::RoleIsMasked { .. })
    ));
}

#[test]
fn turning_off_dynamic_masking_lets_queries_through() {
    let (mut ext, _store) = setup();
    let analyst = Session::new(Principal::new(ANALYST));

    ext.set(ConfigKey::TransparentDynamicMasking, "off", &admin())
        .unwrap();
    assert!(ext.analyze(&analyst, "TRUNCATE people").is_ok());
}

#[test]
fn unknown_policy_is_not_loaded() {
    let (ext, _store) = setup();
    let err = ext
        .security_label(&label("hipaa", ObjectRef::role(ANALYST.0), "MASKED"), &admin())
        .unwrap_err();
    assert_eq!(err.to_string(), "security label provider \"hipaa\" is not loaded");
}

#[test]
fn registered_provider_accepts_labels() {
    let (mut ext, store) = setup();
    assert_eq!(ext.register_label_provider(Some("hipaa")).unwrap(), Some(true));
    ext.security_label(&label("hipaa", ObjectRef::role(ANALYST.0), "MASKED"), &admin())
        .unwrap();
    assert_eq!(store.len(), 1);
    // registering does not change the resolution order
    assert_eq!(ext.list_masking_policies(), vec!["anon", "gdpr"]);
}
