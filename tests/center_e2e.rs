use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use protocast::{
    DeliveryResult, Filter, Identified, NotificationCenter, ObjectId, ObserverId,
};

trait Listener: Send + Sync {
    fn name(&self) -> &str;
    fn hear(&self, msg: &str);
}

trait Unrelated: Send + Sync {}

struct Named {
    name: String,
    heard: Mutex<Vec<String>>,
}

impl Named {
    fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            heard: Mutex::new(Vec::new()),
        })
    }

    fn heard(&self) -> Vec<String> {
        self.heard.lock().unwrap().clone()
    }
}

impl Listener for Named {
    fn name(&self) -> &str {
        &self.name
    }

    fn hear(&self, msg: &str) {
        self.heard.lock().unwrap().push(msg.to_string());
    }
}

impl Unrelated for Named {}

fn as_listener(named: &Arc<Named>) -> Arc<dyn Listener> {
    named.clone()
}

/// Broadcasts and returns the names of the observers reached.
fn reached(center: &NotificationCenter, filter: Option<&Filter>) -> BTreeSet<String> {
    let names = Mutex::new(BTreeSet::new());
    let report = center
        .send::<dyn Listener, _>(
            |l| {
                names.lock().unwrap().insert(l.name().to_string());
                Ok(())
            },
            filter,
        )
        .unwrap();
    assert!(report.is_clean());
    names.into_inner().unwrap()
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(ToString::to_string).collect()
}

#[derive(Debug)]
struct Document {
    id: ObjectId,
}

impl Identified for Document {
    fn object_id(&self) -> &ObjectId {
        &self.id
    }
}

#[test]
fn text_filter_and_wildcard_scenario() {
    let center = NotificationCenter::new();
    let a = as_listener(&Named::new("A"));
    let b = as_listener(&Named::new("B"));
    center.set_observer(&a, Some(Filter::from("red"))).unwrap();
    center.set_observer(&b, None).unwrap();

    assert_eq!(reached(&center, Some(&Filter::from("red"))), set(&["A", "B"]));
    assert_eq!(reached(&center, Some(&Filter::from("blue"))), set(&["B"]));
    assert_eq!(reached(&center, None), set(&["A", "B"]));
}

#[test]
fn mapping_filter_requires_same_key_set() {
    let center = NotificationCenter::new();
    let c = as_listener(&Named::new("C"));
    center.set_observer(&c, Some(Filter::mapping([("k", "v")]))).unwrap();

    assert_eq!(reached(&center, Some(&Filter::mapping([("k", "v")]))), set(&["C"]));
    assert!(reached(&center, Some(&Filter::mapping([("k", "v"), ("extra", "1")]))).is_empty());
}

#[test]
fn reregister_replaces_filter() {
    let center = NotificationCenter::new();
    let o = as_listener(&Named::new("O"));
    center.set_observer(&o, Some(Filter::from("F1"))).unwrap();
    center.set_observer(&o, Some(Filter::from("F2"))).unwrap();

    assert_eq!(center.observer_count::<dyn Listener>().unwrap(), 1);
    let stored = center.registered_filter(&o).unwrap().flatten().unwrap();
    assert_eq!(stored.as_text(), Some("F2"));

    assert!(reached(&center, Some(&Filter::from("F1"))).is_empty());
    assert_eq!(reached(&center, Some(&Filter::from("F2"))), set(&["O"]));
}

#[test]
fn repeated_identical_registration_is_idempotent() {
    let center = NotificationCenter::new();
    let o = as_listener(&Named::new("O"));
    for _ in 0..3 {
        center.set_observer(&o, Some(Filter::from("x"))).unwrap();
    }
    assert_eq!(center.observer_count::<dyn Listener>().unwrap(), 1);
    assert_eq!(reached(&center, Some(&Filter::from("x"))), set(&["O"]));
}

#[test]
fn removal_is_idempotent() {
    let center = NotificationCenter::new();
    let o = as_listener(&Named::new("O"));
    let never = as_listener(&Named::new("N"));
    center.set_observer(&o, None).unwrap();

    assert!(center.remove_observer(&o).unwrap());
    assert!(!center.remove_observer(&o).unwrap());
    assert!(!center.remove_observer(&never).unwrap());
    assert!(reached(&center, None).is_empty());
}

#[test]
fn protocols_are_independent() {
    let center = NotificationCenter::new();
    let named = Named::new("O");
    let listener = as_listener(&named);
    let unrelated: Arc<dyn Unrelated> = named.clone();

    center.set_observer(&listener, None).unwrap();
    center.set_observer(&unrelated, None).unwrap();
    assert_eq!(center.protocol_count().unwrap(), 2);

    center.remove_observer(&unrelated).unwrap();
    assert_eq!(reached(&center, None), set(&["O"]));

    let report = center
        .send::<dyn Unrelated, _>(|_| Ok(()), None)
        .unwrap();
    assert_eq!(report.matched, 0);
}

#[test]
fn identifier_filter_reaches_reference_registration_and_back() {
    let center = NotificationCenter::new();
    let by_ref = as_listener(&Named::new("by_ref"));
    let by_id = as_listener(&Named::new("by_id"));
    let doc = Arc::new(Document {
        id: ObjectId::from_uri("x"),
    });

    center.set_observer(&by_ref, Some(Filter::reference(doc.clone()))).unwrap();
    center
        .set_observer(&by_id, Some(Filter::identifier(ObjectId::from_uri("x"))))
        .unwrap();

    let outgoing_id = Filter::identifier(ObjectId::from_uri("x"));
    let outgoing_ref = Filter::reference(doc);
    let other = Filter::identifier(ObjectId::from_uri("y"));

    assert_eq!(reached(&center, Some(&outgoing_id)), set(&["by_id", "by_ref"]));
    assert_eq!(reached(&center, Some(&outgoing_ref)), set(&["by_id", "by_ref"]));
    assert!(reached(&center, Some(&other)).is_empty());
}

#[test]
fn pattern_filter_matches_stored_text_only_outgoing() {
    let center = NotificationCenter::new();
    let eu = as_listener(&Named::new("eu"));
    let us = as_listener(&Named::new("us"));
    let pattern_holder = as_listener(&Named::new("pattern"));
    center.set_observer(&eu, Some(Filter::from("eu-west-1"))).unwrap();
    center.set_observer(&us, Some(Filter::from("us-east-1"))).unwrap();
    center
        .set_observer(&pattern_holder, Some(Filter::pattern("^eu-").unwrap()))
        .unwrap();

    let outgoing = Filter::pattern("^eu-").unwrap();
    assert_eq!(reached(&center, Some(&outgoing)), set(&["eu", "pattern"]));
    assert_eq!(reached(&center, Some(&Filter::from("eu-west-1"))), set(&["eu"]));
}

#[test]
fn observer_removing_itself_during_delivery() {
    let center = Arc::new(NotificationCenter::new());
    let a = Named::new("A");
    let b = Named::new("B");
    let la = as_listener(&a);
    let lb = as_listener(&b);
    center.set_observer(&la, None).unwrap();
    center.set_observer(&lb, None).unwrap();

    let handles = [la.clone(), lb.clone()];
    let report = center
        .send::<dyn Listener, _>(
            |l| {
                l.hear("bye");
                let me = handles
                    .iter()
                    .find(|h| h.name() == l.name())
                    .ok_or("unknown listener")?;
                center.remove_observer(me)?;
                Ok(())
            },
            None,
        )
        .unwrap();

    assert_eq!(report.delivered, 2);
    assert_eq!(a.heard(), vec!["bye"]);
    assert_eq!(b.heard(), vec!["bye"]);
    assert_eq!(center.observer_count::<dyn Listener>().unwrap(), 0);
}

#[test]
fn delivery_may_reenter_send() {
    let center = NotificationCenter::new();
    let relay = Named::new("relay");
    let sink = Named::new("sink");
    center.set_observer(&as_listener(&relay), Some(Filter::from("relay"))).unwrap();
    let sink_listener = as_listener(&sink);
    center.set_observer(&sink_listener, Some(Filter::from("sink"))).unwrap();

    let outer = center
        .send::<dyn Listener, _>(
            |l| {
                l.hear("outer");
                let inner = center.send::<dyn Listener, _>(
                    |l| {
                        l.hear("inner");
                        Ok(())
                    },
                    Some(&Filter::from("sink")),
                )?;
                inner.into_result().map(|_| ()).map_err(Into::into)
            },
            Some(&Filter::from("relay")),
        )
        .unwrap();

    assert!(outer.is_clean());
    assert_eq!(sink.heard(), vec!["inner"]);
}

#[test]
fn reached_set_equals_matching_entries() {
    let center = NotificationCenter::new();
    let observers: Vec<(Arc<dyn Listener>, Option<Filter>)> = vec![
        (as_listener(&Named::new("w")), None),
        (as_listener(&Named::new("r1")), Some(Filter::from("red"))),
        (as_listener(&Named::new("r2")), Some(Filter::from("red"))),
        (as_listener(&Named::new("b")), Some(Filter::from("blue"))),
        (as_listener(&Named::new("s")), Some(Filter::from(vec!["red"]))),
    ];
    for (o, f) in &observers {
        center.set_observer(o, f.clone()).unwrap();
    }

    for outgoing in [None, Some(Filter::from("red")), Some(Filter::from(vec!["red"]))] {
        let expected: BTreeSet<String> = observers
            .iter()
            .filter(|(_, stored)| match (&outgoing, stored) {
                (Some(out), Some(stored)) => out.matches(stored),
                _ => true,
            })
            .map(|(o, _)| o.name().to_string())
            .collect();
        assert_eq!(reached(&center, outgoing.as_ref()), expected);
    }
}

#[test]
fn report_failures_identify_observers() {
    let center = NotificationCenter::new();
    let ok = as_listener(&Named::new("ok"));
    let bad = as_listener(&Named::new("bad"));
    center.set_observer(&ok, None).unwrap();
    center.set_observer(&bad, None).unwrap();

    let report = center
        .send::<dyn Listener, _>(
            |l| {
                if l.name() == "bad" {
                    return Err(format!("{} refused", l.name()).into());
                }
                Ok(())
            },
            None,
        )
        .unwrap();
    assert_eq!(report.delivered, 1);

    let err = report.into_result().unwrap_err();
    let failures = err.delivery_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].observer, ObserverId::of(&bad));
    assert_eq!(failures[0].reason, "bad refused");
}

#[test]
fn optional_message_is_delivered_or_suppressed() {
    let center = NotificationCenter::new();
    let named = Named::new("O");
    center.set_observer(&as_listener(&named), None).unwrap();

    let mut greet = |l: &(dyn Listener + 'static)| -> DeliveryResult {
        l.hear("hello");
        Ok(())
    };
    let message: &mut dyn FnMut(&(dyn Listener + 'static)) -> DeliveryResult = &mut greet;
    let report = center.send_optional(Some(message), None).unwrap();
    assert!(!report.suppressed);
    assert_eq!(report.delivered, 1);

    let report = center.send_optional::<dyn Listener>(None, None).unwrap();
    assert!(report.suppressed);
    assert_eq!(report.matched, 0);
    assert_eq!(named.heard(), vec!["hello"]);
}
