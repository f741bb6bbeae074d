//! End-to-end write/read round-trips for the core contract kinds.

use std::sync::Arc;

use dcxml::prelude::*;

fn namespace() -> String {
    format!("{CONTRACT_NS_BASE}Test")
}

fn registry_with_person() -> (Arc<ContractRegistry>, TypeHandle) {
    let registry = Arc::new(ContractRegistry::new());
    let person = registry
        .register(
            ContractBuilder::class("Person", namespace())
                .member("Name", registry.string())
                .member("Age", registry.int()),
        )
        .unwrap();
    (registry, person)
}

#[test]
fn simple_class_exact_xml() {
    let (registry, person) = registry_with_person();
    let mut graph = Graph::new();
    let root = graph.add_object(
        person,
        vec![("Name", Value::string("John")), ("Age", Value::int(42))],
    );
    let serializer = Serializer::new(registry);
    let xml = serializer
        .write_to_string(&graph, &Value::Ref(root), person)
        .unwrap();
    assert_eq!(
        xml,
        r#"<Person xmlns="http://schemas.datacontract.org/2004/07/Test"><Name>John</Name><Age>42</Age></Person>"#
    );
}

#[test]
fn simple_class_roundtrip() {
    let (registry, person) = registry_with_person();
    let mut graph = Graph::new();
    let root = graph.add_object(
        person,
        vec![("Name", Value::string("Ada")), ("Age", Value::int(36))],
    );
    let serializer = Serializer::new(registry);
    let xml = serializer
        .write_to_string(&graph, &Value::Ref(root), person)
        .unwrap();
    let (decoded, value) = serializer.read(xml.as_bytes(), person).unwrap();
    let node = decoded.node(value.as_node().unwrap());
    assert_eq!(node.member("Name"), Some(&Value::string("Ada")));
    assert_eq!(node.member("Age"), Some(&Value::int(36)));
}

#[test]
fn nested_class_roundtrip() {
    let registry = Arc::new(ContractRegistry::new());
    let address = registry
        .register(
            ContractBuilder::class("Address", namespace())
                .member("Street", registry.string())
                .member("Zip", registry.string()),
        )
        .unwrap();
    let person = registry
        .register(
            ContractBuilder::class("Person", namespace())
                .member("Name", registry.string())
                .member("Home", address),
        )
        .unwrap();

    let mut graph = Graph::new();
    let home = graph.add_object(
        address,
        vec![
            ("Street", Value::string("1 Main St")),
            ("Zip", Value::string("90210")),
        ],
    );
    let root = graph.add_object(
        person,
        vec![("Name", Value::string("John")), ("Home", Value::Ref(home))],
    );

    let serializer = Serializer::new(registry);
    let xml = serializer
        .write_to_string(&graph, &Value::Ref(root), person)
        .unwrap();
    let (decoded, value) = serializer.read(xml.as_bytes(), person).unwrap();
    let node = decoded.node(value.as_node().unwrap());
    let home_id = node.member("Home").unwrap().as_node().unwrap();
    assert_eq!(
        decoded.node(home_id).member("Zip"),
        Some(&Value::string("90210"))
    );
}

#[test]
fn nil_member_roundtrip() {
    let (registry, person) = registry_with_person();
    let mut graph = Graph::new();
    let root = graph.add_object(
        person,
        vec![("Name", Value::Null), ("Age", Value::int(1))],
    );
    let serializer = Serializer::new(registry);
    let xml = serializer
        .write_to_string(&graph, &Value::Ref(root), person)
        .unwrap();
    assert!(xml.contains(r#"<Name i:nil="true"/>"#));
    let (decoded, value) = serializer.read(xml.as_bytes(), person).unwrap();
    assert_eq!(
        decoded.node(value.as_node().unwrap()).member("Name"),
        Some(&Value::Null)
    );
}

#[test]
fn int_collection_exact_xml() {
    let registry = Arc::new(ContractRegistry::new());
    let ints = registry
        .register(ContractBuilder::collection(registry.int()))
        .unwrap();
    let mut graph = Graph::new();
    let root = graph.add_collection(ints, vec![Value::int(1), Value::int(2), Value::int(3)]);
    let serializer = Serializer::new(registry);
    let xml = serializer
        .write_to_string(&graph, &Value::Ref(root), ints)
        .unwrap();
    assert_eq!(
        xml,
        r#"<ArrayOfint xmlns="http://schemas.microsoft.com/2003/10/Serialization/Arrays"><int>1</int><int>2</int><int>3</int></ArrayOfint>"#
    );
    let (decoded, value) = serializer.read(xml.as_bytes(), ints).unwrap();
    match &decoded.node(value.as_node().unwrap()).body {
        NodeBody::Collection(items) => assert_eq!(items.len(), 3),
        other => panic!("expected collection body, got {other:?}"),
    }
}

#[test]
fn string_int_dictionary_exact_xml() {
    let registry = Arc::new(ContractRegistry::new());
    let map = registry
        .register(ContractBuilder::dictionary(
            registry.string(),
            registry.int(),
        ))
        .unwrap();
    let mut graph = Graph::new();
    let root = graph.add_dictionary(
        map,
        vec![
            (Value::string("one"), Value::int(1)),
            (Value::string("two"), Value::int(2)),
        ],
    );
    let serializer = Serializer::new(registry);
    let xml = serializer
        .write_to_string(&graph, &Value::Ref(root), map)
        .unwrap();
    assert_eq!(
        xml,
        r#"<ArrayOfKeyValueOfstringint xmlns="http://schemas.microsoft.com/2003/10/Serialization/Arrays"><KeyValueOfstringint><Key>one</Key><Value>1</Value></KeyValueOfstringint><KeyValueOfstringint><Key>two</Key><Value>2</Value></KeyValueOfstringint></ArrayOfKeyValueOfstringint>"#
    );
    let (decoded, value) = serializer.read(xml.as_bytes(), map).unwrap();
    match &decoded.node(value.as_node().unwrap()).body {
        NodeBody::Dictionary(entries) => {
            assert_eq!(entries[0], (Value::string("one"), Value::int(1)));
            assert_eq!(entries[1], (Value::string("two"), Value::int(2)));
        }
        other => panic!("expected dictionary body, got {other:?}"),
    }
}

#[test]
fn special_float_values_roundtrip() {
    let registry = Arc::new(ContractRegistry::new());
    let holder = registry
        .register(
            ContractBuilder::class("Floats", namespace())
                .member("D", registry.primitive(XsdPrimitive::Double))
                .member("F", registry.primitive(XsdPrimitive::Float)),
        )
        .unwrap();
    let serializer = Serializer::new(registry);

    for (d, f) in [
        (f64::INFINITY, f32::NEG_INFINITY),
        (f64::MIN, f32::MAX),
        (-0.0f64, 0.0f32),
        (1e-5, 1.5f32),
    ] {
        let mut graph = Graph::new();
        let root = graph.add_object(
            holder,
            vec![
                ("D", Value::Prim(Primitive::R8(d))),
                ("F", Value::Prim(Primitive::R4(f))),
            ],
        );
        let xml = serializer
            .write_to_string(&graph, &Value::Ref(root), holder)
            .unwrap();
        let (decoded, value) = serializer.read(xml.as_bytes(), holder).unwrap();
        let node = decoded.node(value.as_node().unwrap());
        match node.member("D").unwrap() {
            Value::Prim(Primitive::R8(back)) => {
                assert_eq!(back.to_bits(), d.to_bits(), "double {d} via {xml}");
            }
            other => panic!("expected double, got {other:?}"),
        }
        match node.member("F").unwrap() {
            Value::Prim(Primitive::R4(back)) => {
                assert_eq!(back.to_bits(), f.to_bits(), "float {f} via {xml}");
            }
            other => panic!("expected float, got {other:?}"),
        }
    }
}

#[test]
fn float_token_spelling() {
    let registry = Arc::new(ContractRegistry::new());
    let holder = registry
        .register(
            ContractBuilder::class("Floats", namespace())
                .member("D", registry.primitive(XsdPrimitive::Double)),
        )
        .unwrap();
    let serializer = Serializer::new(registry);
    let mut graph = Graph::new();
    let root = graph.add_object(
        holder,
        vec![("D", Value::Prim(Primitive::R8(f64::NEG_INFINITY)))],
    );
    let xml = serializer
        .write_to_string(&graph, &Value::Ref(root), holder)
        .unwrap();
    assert!(xml.contains("<D>-INF</D>"), "{xml}");
}

#[test]
fn decimal_preserves_textual_precision() {
    let registry = Arc::new(ContractRegistry::new());
    let holder = registry
        .register(
            ContractBuilder::class("Money", namespace())
                .member("Amount", registry.primitive(XsdPrimitive::Decimal)),
        )
        .unwrap();
    let serializer = Serializer::new(registry);
    let mut graph = Graph::new();
    let amount = Decimal::new("1.50").unwrap();
    let root = graph.add_object(
        holder,
        vec![("Amount", Value::Prim(Primitive::Decimal(amount)))],
    );
    let xml = serializer
        .write_to_string(&graph, &Value::Ref(root), holder)
        .unwrap();
    // 1.50 stays 1.50, never 1.5
    assert!(xml.contains("<Amount>1.50</Amount>"), "{xml}");
    let (decoded, value) = serializer.read(xml.as_bytes(), holder).unwrap();
    match decoded.node(value.as_node().unwrap()).member("Amount").unwrap() {
        Value::Prim(Primitive::Decimal(back)) => assert_eq!(back.as_str(), "1.50"),
        other => panic!("expected decimal, got {other:?}"),
    }
}

#[test]
fn temporal_and_binary_primitives_roundtrip() {
    let registry = Arc::new(ContractRegistry::new());
    let holder = registry
        .register(
            ContractBuilder::class("Blob", namespace())
                .member("When", registry.primitive(XsdPrimitive::DateTime))
                .member("HowLong", registry.primitive(XsdPrimitive::Duration))
                .member("Id", registry.primitive(XsdPrimitive::Guid))
                .member("Payload", registry.primitive(XsdPrimitive::Base64Binary)),
        )
        .unwrap();
    let serializer = Serializer::new(registry.clone());

    let when = DateTime::new(638_000_000_000_000_000, DateTimeKind::Utc);
    let guid = uguid::guid!("0a141e28-323c-4650-5a64-6e78828c96a0");
    let mut graph = Graph::new();
    let root = graph.add_object(
        holder,
        vec![
            ("When", Value::Prim(Primitive::DateTime(when))),
            ("HowLong", Value::Prim(Primitive::TimeSpan(-863_999_999_999))),
            ("Id", Value::Prim(Primitive::Guid(guid))),
            (
                "Payload",
                Value::Prim(Primitive::Base64(vec![0x00, 0xFF, 0x10])),
            ),
        ],
    );
    let xml = serializer
        .write_to_string(&graph, &Value::Ref(root), holder)
        .unwrap();
    assert!(xml.contains("<Id>0a141e28-323c-4650-5a64-6e78828c96a0</Id>"), "{xml}");
    assert!(xml.contains("<Payload>AP8Q</Payload>"), "{xml}");

    let (decoded, value) = serializer.read(xml.as_bytes(), holder).unwrap();
    let node = decoded.node(value.as_node().unwrap());
    assert_eq!(node.member("When"), Some(&Value::Prim(Primitive::DateTime(when))));
    assert_eq!(
        node.member("HowLong"),
        Some(&Value::Prim(Primitive::TimeSpan(-863_999_999_999)))
    );
    assert_eq!(node.member("Id"), Some(&Value::Prim(Primitive::Guid(guid))));
    assert_eq!(
        node.member("Payload"),
        Some(&Value::Prim(Primitive::Base64(vec![0x00, 0xFF, 0x10])))
    );
}

#[test]
fn enum_members_roundtrip() {
    let registry = Arc::new(ContractRegistry::new());
    let color = registry
        .register(
            ContractBuilder::enumeration("Color", namespace())
                .value("Red", 0)
                .value("Green", 1)
                .value("Blue", 2),
        )
        .unwrap();
    let access = registry
        .register(
            ContractBuilder::enumeration("Access", namespace())
                .flags()
                .value("Read", 1)
                .value("Write", 2)
                .value("Execute", 4),
        )
        .unwrap();
    let holder = registry
        .register(
            ContractBuilder::class("Perms", namespace())
                .member("Tint", color)
                .member("Mode", access),
        )
        .unwrap();

    let serializer = Serializer::new(registry);
    let mut graph = Graph::new();
    let root = graph.add_object(
        holder,
        vec![
            ("Tint", Value::Enum { ty: color, bits: 2 }),
            ("Mode", Value::Enum { ty: access, bits: 5 }),
        ],
    );
    let xml = serializer
        .write_to_string(&graph, &Value::Ref(root), holder)
        .unwrap();
    assert!(xml.contains("<Tint>Blue</Tint>"), "{xml}");
    assert!(xml.contains("<Mode>Read Execute</Mode>"), "{xml}");

    let (decoded, value) = serializer.read(xml.as_bytes(), holder).unwrap();
    let node = decoded.node(value.as_node().unwrap());
    assert_eq!(node.member("Tint"), Some(&Value::Enum { ty: color, bits: 2 }));
    assert_eq!(node.member("Mode"), Some(&Value::Enum { ty: access, bits: 5 }));
}

#[test]
fn date_time_offset_structure_roundtrip() {
    let registry = Arc::new(ContractRegistry::new());
    let dto = registry.date_time_offset();
    let holder = registry
        .register(ContractBuilder::class("Stamp", namespace()).member("At", dto))
        .unwrap();

    let serializer = Serializer::new(registry);
    let mut graph = Graph::new();
    let when = DateTime::new(630_000_000_000_000_000, DateTimeKind::Utc);
    let at = graph.add_object(
        dto,
        vec![
            ("DateTime", Value::Prim(Primitive::DateTime(when))),
            ("OffsetMinutes", Value::Prim(Primitive::I2(120))),
        ],
    );
    let root = graph.add_object(holder, vec![("At", Value::Ref(at))]);

    let xml = serializer
        .write_to_string(&graph, &Value::Ref(root), holder)
        .unwrap();
    assert!(xml.contains("<OffsetMinutes>120</OffsetMinutes>"), "{xml}");
    let (decoded, value) = serializer.read(xml.as_bytes(), holder).unwrap();
    let at_id = decoded
        .node(value.as_node().unwrap())
        .member("At")
        .unwrap()
        .as_node()
        .unwrap();
    assert_eq!(
        decoded.node(at_id).member("OffsetMinutes"),
        Some(&Value::Prim(Primitive::I2(120)))
    );
}

#[test]
fn inherited_members_precede_own() {
    let registry = Arc::new(ContractRegistry::new());
    let base = registry
        .register(ContractBuilder::class("Animal", namespace()).member("Name", registry.string()))
        .unwrap();
    let derived = registry
        .register(
            ContractBuilder::class("Dog", namespace())
                .base(base)
                .member("Breed", registry.string()),
        )
        .unwrap();

    let serializer = Serializer::new(registry);
    let mut graph = Graph::new();
    let root = graph.add_object(
        derived,
        vec![
            ("Breed", Value::string("Collie")),
            ("Name", Value::string("Rex")),
        ],
    );
    let xml = serializer
        .write_to_string(&graph, &Value::Ref(root), derived)
        .unwrap();
    // Wire order is base first, regardless of graph insertion order
    assert_eq!(
        xml,
        r#"<Dog xmlns="http://schemas.datacontract.org/2004/07/Test"><Name>Rex</Name><Breed>Collie</Breed></Dog>"#
    );
}

#[test]
fn explicit_member_order_applies() {
    let registry = Arc::new(ContractRegistry::new());
    let holder = registry
        .register(
            ContractBuilder::class("Ordered", namespace())
                .member_with("Z", registry.int(), 2, MemberFlags::default())
                .member_with("A", registry.int(), 1, MemberFlags::default())
                .member("Plain", registry.int()),
        )
        .unwrap();
    let serializer = Serializer::new(registry);
    let mut graph = Graph::new();
    let root = graph.add_object(
        holder,
        vec![
            ("Z", Value::int(3)),
            ("A", Value::int(1)),
            ("Plain", Value::int(2)),
        ],
    );
    let xml = serializer
        .write_to_string(&graph, &Value::Ref(root), holder)
        .unwrap();
    // Unordered members come first in declaration order, then by order key
    assert_eq!(
        xml,
        r#"<Ordered xmlns="http://schemas.datacontract.org/2004/07/Test"><Plain>2</Plain><A>1</A><Z>3</Z></Ordered>"#
    );
}
