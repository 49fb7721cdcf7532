//! Driver tests: resolution, dispatch, and the transaction state machine.

use std::collections::VecDeque;

use stratum_types::{Data, DataKey, SessionToken, Timestamp, Value};
use stratum_wire::{ValueTag, WireData, WireParam, WireValue};

use crate::args::{CallArgs, NamedArgs};
use crate::client::{Client, ClientConfig};
use crate::error::{DriverError, DriverResult};
use crate::registry::{self, Arity, Method};
use crate::resolver;
use crate::transport::Transport;

// ============================================================================
// Mock transport
// ============================================================================

/// Records every invocation and plays back queued replies.
struct MockTransport {
    calls: Vec<(String, Vec<WireParam>)>,
    replies: VecDeque<DriverResult<WireData>>,
    fail_login: bool,
}

impl MockTransport {
    fn new() -> Self {
        Self {
            calls: Vec::new(),
            replies: VecDeque::new(),
            fail_login: false,
        }
    }

    fn reply(mut self, data: WireData) -> Self {
        self.replies.push_back(Ok(data));
        self
    }

    fn reply_err(mut self, err: DriverError) -> Self {
        self.replies.push_back(Err(err));
        self
    }
}

impl Transport for MockTransport {
    fn login(
        &mut self,
        _username: &str,
        _password: &str,
        _environment: &str,
    ) -> DriverResult<SessionToken> {
        if self.fail_login {
            Err(DriverError::Security("invalid credentials".to_string()))
        } else {
            Ok(SessionToken::new("mock-token"))
        }
    }

    fn invoke(&mut self, op: &str, params: Vec<WireParam>) -> DriverResult<WireData> {
        self.calls.push((op.to_string(), params));
        self.replies
            .pop_front()
            .unwrap_or_else(|| Ok(WireData::Value(WireValue::encode(&Value::Null))))
    }

    fn logout(&mut self, _token: &SessionToken, _environment: &str) -> DriverResult<()> {
        Ok(())
    }
}

fn test_client(transport: MockTransport) -> Client<MockTransport> {
    let config = ClientConfig::default().with_environment("testing");
    Client::with_transport(transport, &config).expect("mock login")
}

fn text(s: &str) -> WireParam {
    WireParam::Value(WireValue::encode(&Value::Text(s.to_string())))
}

fn integer(i: i64) -> WireParam {
    WireParam::Value(WireValue::encode(&Value::Integer(i)))
}

// ============================================================================
// Call resolution
// ============================================================================

#[test]
fn get_positional_key_record_selects_single_variant() {
    let (op, params) =
        resolver::resolve(Method::Get, CallArgs::new().with("name").with(42i64)).unwrap();
    assert_eq!(op, "get_key_record");
    assert_eq!(params, vec![text("name"), integer(42)]);
}

#[test]
fn get_named_keys_records_selects_multi_variant() {
    let args = CallArgs::new()
        .named("keys", vec!["name", "age"])
        .named("records", vec![42i64, 43]);
    let (op, params) = resolver::resolve(Method::Get, args).unwrap();
    assert_eq!(op, "get_keys_records");
    assert_eq!(
        params,
        vec![
            WireParam::List(vec![
                WireValue::encode(&Value::Text("name".into())),
                WireValue::encode(&Value::Text("age".into())),
            ]),
            WireParam::List(vec![
                WireValue::encode(&Value::Integer(42)),
                WireValue::encode(&Value::Integer(43)),
            ]),
        ]
    );
}

#[test]
fn named_argument_order_never_changes_parameter_order() {
    // records named before keys; the variant still puts keys first.
    let args = CallArgs::new()
        .named("records", vec![1i64, 2])
        .named("keys", vec!["a", "b"]);
    let (op, params) = resolver::resolve(Method::Get, args).unwrap();
    assert_eq!(op, "get_keys_records");
    assert!(matches!(&params[0], WireParam::List(items) if items[0].tag() == ValueTag::Text));
    assert!(matches!(&params[1], WireParam::List(items) if items[0].tag() == ValueTag::Integer));
}

#[test]
fn browse_keys_with_timestamp_never_picks_single_key_variant() {
    let args = CallArgs::new()
        .named("keys", vec!["name", "age"])
        .named("timestamp", 1_700_000_000_000_000i64);
    let (op, _) = resolver::resolve(Method::Browse, args).unwrap();
    assert_eq!(op, "browse_keys_time");
}

#[test]
fn trailing_bundle_is_extracted_not_positional() {
    let bundle = NamedArgs::new().set("record", 42i64);
    let args = CallArgs::new().with("name").with(bundle);
    let (op, _) = resolver::resolve(Method::Get, args).unwrap();
    assert_eq!(op, "get_key_record");
}

#[test]
fn non_trailing_bundle_is_rejected() {
    let bundle = NamedArgs::new().set("record", 42i64);
    let args = CallArgs::new().with(bundle).with("name");
    assert!(matches!(
        resolver::resolve(Method::Get, args),
        Err(DriverError::Resolution { .. })
    ));
}

#[test]
fn audit_shapes_split_on_leading_key() {
    let (op, _) = resolver::resolve(Method::Audit, CallArgs::new().with(42i64)).unwrap();
    assert_eq!(op, "audit_record");

    let (op, _) =
        resolver::resolve(Method::Audit, CallArgs::new().with("name").with(42i64)).unwrap();
    assert_eq!(op, "audit_key_record");

    let (op, _) = resolver::resolve(
        Method::Audit,
        CallArgs::new().with(42i64).with("3 days ago"),
    )
    .unwrap();
    assert_eq!(op, "audit_record_start");

    let (op, params) = resolver::resolve(
        Method::Audit,
        CallArgs::new()
            .with("name")
            .with(42i64)
            .named("since", 10i64)
            .named("until", 20i64),
    )
    .unwrap();
    assert_eq!(op, "audit_key_record_start_end");
    assert_eq!(params.len(), 4);
}

#[test]
fn add_without_record_targets_new_record() {
    let (op, _) =
        resolver::resolve(Method::Add, CallArgs::new().with("name").with("jane")).unwrap();
    assert_eq!(op, "add_key_value");
}

#[test]
fn add_with_record_collection_targets_many() {
    let args = CallArgs::new().with("name").with("jane").with(vec![1i64, 2]);
    let (op, _) = resolver::resolve(Method::Add, args).unwrap();
    assert_eq!(op, "add_key_value_records");
}

#[test]
fn criteria_resolves_by_name() {
    let args = CallArgs::new().named("where", "age > 30");
    let (op, params) = resolver::resolve(Method::Get, args).unwrap();
    assert_eq!(op, "get_criteria");
    assert_eq!(params, vec![text("age > 30")]);
}

#[test]
fn time_with_no_arguments_uses_server_clock() {
    let (op, params) = resolver::resolve(Method::Time, CallArgs::new()).unwrap();
    assert_eq!(op, "time");
    assert!(params.is_empty());
}

#[test]
fn time_phrase_is_forwarded_verbatim() {
    let (op, params) =
        resolver::resolve(Method::Time, CallArgs::new().with("3 seconds ago")).unwrap();
    assert_eq!(op, "time_phrase");
    // The phrase is the server's to interpret; it stays text.
    assert_eq!(params, vec![text("3 seconds ago")]);
}

#[test]
fn textual_timestamp_is_converted_to_an_instant() {
    let args = CallArgs::new()
        .with("name")
        .with(42i64)
        .named("ts", "2024-01-02");
    let (op, params) = resolver::resolve(Method::Get, args).unwrap();
    assert_eq!(op, "get_key_record_time");
    match &params[2] {
        WireParam::Value(v) => assert_eq!(v.tag(), ValueTag::Timestamp),
        other => panic!("expected timestamp param, got {other:?}"),
    }
}

#[test]
fn numeric_timestamp_passes_through_exactly() {
    let args = CallArgs::new()
        .with("name")
        .named("timestamp", "1700000000000");
    let (op, params) = resolver::resolve(Method::Browse, args).unwrap();
    assert_eq!(op, "browse_key_time");
    match &params[1] {
        WireParam::Value(v) => assert_eq!(
            v.decode().unwrap(),
            Value::Timestamp(Timestamp::from_micros(1_700_000_000_000))
        ),
        other => panic!("expected timestamp param, got {other:?}"),
    }
}

#[test]
fn unparseable_time_expression_fails() {
    let args = CallArgs::new().with("name").named("ts", "a while back");
    assert!(matches!(
        resolver::resolve(Method::Browse, args),
        Err(DriverError::TimeParse(_))
    ));
}

#[test]
fn double_supply_of_a_role_is_a_resolution_error() {
    let args = CallArgs::new().with("name").named("key", "age").with(42i64);
    let err = resolver::resolve(Method::Get, args).unwrap_err();
    match err {
        DriverError::Resolution { method, detail } => {
            assert_eq!(method, "get");
            assert!(detail.contains("key"), "detail: {detail}");
        }
        other => panic!("expected Resolution, got {other:?}"),
    }
}

#[test]
fn missing_required_role_is_named() {
    let err = resolver::resolve(Method::Add, CallArgs::new().with("name")).unwrap_err();
    match err {
        DriverError::MissingArgument { method, role } => {
            assert_eq!(method, "add");
            assert_eq!(role, "value");
        }
        other => panic!("expected MissingArgument, got {other:?}"),
    }
}

#[test]
fn unresolvable_shapes_fail_resolution() {
    // A record alone cannot choose between browse_key and browse_keys.
    assert!(matches!(
        resolver::resolve(Method::Browse, CallArgs::new().with(42i64)),
        Err(DriverError::Resolution { .. })
    ));
    // Nothing at all is not a get.
    assert!(matches!(
        resolver::resolve(Method::Get, CallArgs::new()),
        Err(DriverError::Resolution { .. })
    ));
    // A float fits no browse role.
    assert!(matches!(
        resolver::resolve(Method::Browse, CallArgs::new().with(1.5f64)),
        Err(DriverError::Resolution { .. })
    ));
}

/// Every declared variant is uniquely addressable: synthesizing named
/// arguments for exactly its roles and arities resolves back to it.
#[test]
fn every_registry_variant_is_reachable() {
    for method in [
        Method::Add,
        Method::Get,
        Method::Set,
        Method::Browse,
        Method::Audit,
        Method::Time,
    ] {
        for variant in registry::variants_for(method) {
            let mut args = CallArgs::new();
            for (role, arity) in variant.params {
                let spelling = crate::alias::spellings(*role)[0];
                args = match (role.name(), *arity) {
                    ("key", Arity::One) => args.named(spelling, "name"),
                    ("key", Arity::Many) => args.named(spelling, vec!["name", "age"]),
                    ("value", Arity::One) => args.named(spelling, 1i64),
                    ("value", Arity::Many) => args.named(spelling, vec![1i64, 2]),
                    ("record", Arity::One) => args.named(spelling, 42i64),
                    ("record", Arity::Many) => args.named(spelling, vec![42i64, 43]),
                    ("criteria", _) => args.named(spelling, "age > 3"),
                    ("timestamp" | "start" | "end", _) => {
                        args.named(spelling, 1_700_000_000_000_000i64)
                    }
                    ("phrase", _) => args.named(spelling, "now"),
                    (role, _) => panic!("unhandled role {role}"),
                };
            }
            let (op, params) = resolver::resolve(method, args)
                .unwrap_or_else(|e| panic!("variant {} unreachable: {e}", variant.op));
            assert_eq!(op, variant.op);
            assert_eq!(params.len(), variant.params.len());
        }
    }
}

// ============================================================================
// Dispatch and the session triple
// ============================================================================

#[test]
fn dispatch_appends_credential_transaction_environment() {
    let mut client = test_client(MockTransport::new());
    client.get(CallArgs::new().with("name").with(42i64)).unwrap();

    let (op, params) = &client.transport.calls[0];
    assert_eq!(op, "get_key_record");
    assert_eq!(
        params,
        &vec![
            text("name"),
            integer(42),
            WireParam::Credential(SessionToken::new("mock-token")),
            WireParam::Transaction(None),
            WireParam::Environment("testing".to_string()),
        ]
    );
}

#[test]
fn dispatch_inside_transaction_carries_its_id() {
    let transport =
        MockTransport::new().reply(WireData::Value(WireValue::encode(&Value::Integer(7))));
    let mut client = test_client(transport);
    client.stage().unwrap();
    client.get(CallArgs::new().with("name").with(42i64)).unwrap();

    let (_, params) = &client.transport.calls[1];
    assert!(params
        .iter()
        .any(|p| matches!(p, WireParam::Transaction(Some(id)) if u64::from(*id) == 7)));
}

#[test]
fn structured_results_decode_to_native_data() {
    let wire = WireData::Map(vec![(
        WireValue::encode(&Value::Integer(42)),
        WireData::Value(WireValue::encode(&Value::Text("jane".into()))),
    )]);
    let mut client = test_client(MockTransport::new().reply(wire));
    let data = client
        .get(CallArgs::new().named("key", "name").named("records", vec![42i64]))
        .unwrap();

    let map = data.as_map().expect("map result");
    assert_eq!(
        map.get(&DataKey::Record(42)),
        Some(&Data::Value(Value::Text("jane".into())))
    );
}

#[test]
fn server_errors_surface_unchanged() {
    let transport = MockTransport::new().reply_err(DriverError::Server {
        code: stratum_wire::ErrorCode::InvalidParameter,
        message: "bad key".to_string(),
    });
    let mut client = test_client(transport);
    assert!(matches!(
        client.get(CallArgs::new().with("name").with(1i64)),
        Err(DriverError::Server { .. })
    ));
}

#[test]
fn failed_login_is_a_security_error() {
    let transport = MockTransport {
        fail_login: true,
        ..MockTransport::new()
    };
    let config = ClientConfig::default();
    assert!(matches!(
        Client::with_transport(transport, &config),
        Err(DriverError::Security(_))
    ));
}

#[test]
fn resolution_failures_never_reach_the_transport() {
    let mut client = test_client(MockTransport::new());
    let _ = client.get(CallArgs::new());
    assert!(client.transport.calls.is_empty());
}

// ============================================================================
// Transaction state machine
// ============================================================================

#[test]
fn stage_then_abort_returns_to_autocommit() {
    let transport =
        MockTransport::new().reply(WireData::Value(WireValue::encode(&Value::Integer(9))));
    let mut client = test_client(transport);

    client.stage().unwrap();
    assert!(client.in_transaction());

    client.abort().unwrap();
    assert!(!client.in_transaction());

    let ops: Vec<&str> = client.transport.calls.iter().map(|(op, _)| op.as_str()).collect();
    assert_eq!(ops, vec!["stage", "abort"]);
    // The abort names the transaction being discarded.
    assert!(client.transport.calls[1]
        .1
        .iter()
        .any(|p| matches!(p, WireParam::Transaction(Some(id)) if u64::from(*id) == 9)));
}

#[test]
fn commit_clears_transaction_and_reports_acceptance() {
    let transport = MockTransport::new()
        .reply(WireData::Value(WireValue::encode(&Value::Integer(3))))
        .reply(WireData::Value(WireValue::encode(&Value::Boolean(true))));
    let mut client = test_client(transport);

    client.stage().unwrap();
    assert!(client.commit().unwrap());
    assert!(!client.in_transaction());
}

#[test]
fn failed_commit_retains_transaction_for_retry() {
    let transport = MockTransport::new()
        .reply(WireData::Value(WireValue::encode(&Value::Integer(3))))
        .reply_err(DriverError::Connection(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "lost",
        )));
    let mut client = test_client(transport);

    client.stage().unwrap();
    assert!(client.commit().is_err());
    assert!(client.in_transaction());
}

#[test]
fn transaction_controls_are_noops_in_autocommit() {
    let mut client = test_client(MockTransport::new());
    client.abort().unwrap();
    assert!(!client.commit().unwrap());
    assert!(client.transport.calls.is_empty());
}

#[test]
fn failed_stage_leaves_state_unchanged() {
    let transport = MockTransport::new().reply_err(DriverError::Connection(
        std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"),
    ));
    let mut client = test_client(transport);

    assert!(client.stage().is_err());
    assert!(!client.in_transaction());
}
