use speak_compiler::{
    parse_file, parse_text,
    types::{ArraySpec, BasicType, Declaration, FieldType, Position, QualifiedTypeRef},
    SpeakError,
};

const PAINT: &str = r#"
package paint

enum Color
    1: Red
    2: Green
    3: Blue
end

type XyCoordinate [2]float32

choice Shape
    1: geo.Circle
    2: Square
end

message PaintRequest
    1: id           msg.Id        // Use type 'Id' in package 'msg'.
    2: color        Color
    3: brushSize    float32       // Brush size in millimetres.
    4: xyCoordinate XyCoordinate
    5: trail        []XyCoordinate
end
"#;

fn messages(text: &str) -> Vec<String> {
    parse_text("test.speak", text)
        .diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect()
}

#[test]
fn test_parse_paint_schema() {
    let parsed = parse_text("paint.speak", PAINT);
    assert!(parsed.is_ok(), "unexpected diagnostics: {:?}", parsed.diagnostics);

    let file = parsed.file;
    assert_eq!(file.name, "paint.speak");
    assert_eq!(file.package.as_deref(), Some("paint"));
    assert_eq!(file.declarations.len(), 5);

    // Package
    let Declaration::Package(package) = &file.declarations[0] else {
        panic!("expected package, got {:?}", file.declarations[0]);
    };
    assert_eq!(package.name, "paint");
    assert_eq!(package.pos, Position { line: 2, column: 1 });

    // Enum Color
    let Declaration::Enum(color) = &file.declarations[1] else {
        panic!("expected enum, got {:?}", file.declarations[1]);
    };
    assert_eq!(color.name, "Color");
    assert_eq!(color.pos, Position { line: 4, column: 1 });
    let values: Vec<(u32, &str)> = color.fields.iter().map(|f| (f.tag, f.name.as_str())).collect();
    assert_eq!(values, vec![(1, "Red"), (2, "Green"), (3, "Blue")]);
    assert_eq!(color.fields[0].pos, Position { line: 5, column: 5 });

    // Type alias
    let Declaration::TypeAlias(xy) = &file.declarations[2] else {
        panic!("expected type alias, got {:?}", file.declarations[2]);
    };
    assert_eq!(xy.name, "XyCoordinate");
    assert_eq!(xy.array, Some(ArraySpec::Fixed(2)));
    assert_eq!(xy.basic, BasicType::Float32);

    // Choice Shape
    let Declaration::Choice(shape) = &file.declarations[3] else {
        panic!("expected choice, got {:?}", file.declarations[3]);
    };
    assert_eq!(shape.name, "Shape");
    assert_eq!(shape.fields.len(), 2);
    assert_eq!(shape.fields[0].type_, QualifiedTypeRef::qualified("geo", "Circle"));
    assert_eq!(shape.fields[1].type_, QualifiedTypeRef::local("Square"));

    // Message PaintRequest
    let Declaration::Message(request) = &file.declarations[4] else {
        panic!("expected message, got {:?}", file.declarations[4]);
    };
    assert_eq!(request.name, "PaintRequest");
    assert_eq!(request.fields.len(), 5);
    assert_eq!(request.fields[0].name, "id");
    assert_eq!(request.fields[0].type_, FieldType::Named(QualifiedTypeRef::qualified("msg", "Id")));
    assert_eq!(request.fields[1].type_, FieldType::Named(QualifiedTypeRef::local("Color")));
    assert_eq!(request.fields[2].name, "brushSize");
    assert_eq!(request.fields[2].type_, FieldType::Basic(BasicType::Float32));
    assert_eq!(request.fields[2].array, None);
    assert_eq!(request.fields[4].tag, 5);
    assert_eq!(request.fields[4].array, Some(ArraySpec::Dynamic));

    let packages: Vec<&str> = file.referenced_packages().into_iter().collect();
    assert_eq!(packages, vec!["geo", "msg"]);
}

#[test]
fn test_round_trip_through_printer() {
    let first = parse_text("paint.speak", PAINT);
    assert!(first.is_ok());
    let printed = first.file.to_string();

    let second = parse_text("paint.speak", &printed);
    assert!(second.is_ok(), "{:?}", second.diagnostics);
    assert_eq!(second.file.declarations.len(), first.file.declarations.len());
    assert_eq!(second.file.package, first.file.package);
    assert_eq!(second.file.type_refs(), first.file.type_refs());
    assert_eq!(second.file.to_string(), printed);
}

#[test]
fn test_type_alias_sha1() {
    let parsed = parse_text("hash.speak", "type Sha1 [20]byte\n");
    assert!(parsed.diagnostics.is_empty());
    assert_eq!(parsed.file.declarations.len(), 1);
    match &parsed.file.declarations[0] {
        Declaration::TypeAlias(alias) => {
            assert_eq!(alias.name, "Sha1");
            assert_eq!(alias.array, Some(ArraySpec::Fixed(20)));
            assert_eq!(alias.basic, BasicType::Byte);
            assert_eq!(alias.basic.width(), BasicType::Uint8.width());
        }
        other => panic!("expected type alias, got {:?}", other),
    }
}

#[test]
fn test_qualified_reference_without_package() {
    let parsed = parse_text("m.speak", "message M\n    1: id msg.Id\nend\n");
    assert!(parsed.is_ok(), "{:?}", parsed.diagnostics);
    assert_eq!(parsed.file.package, None);
    match &parsed.file.declarations[0] {
        Declaration::Message(message) => {
            assert_eq!(message.fields.len(), 1);
            assert_eq!(
                message.fields[0].type_,
                FieldType::Named(QualifiedTypeRef::qualified("msg", "Id"))
            );
        }
        other => panic!("expected message, got {:?}", other),
    }
}

#[test]
fn test_zero_sized_array_is_accepted() {
    let parsed = parse_text("z.speak", "type Empty [0]byte\n");
    assert!(parsed.is_ok());
    match &parsed.file.declarations[0] {
        Declaration::TypeAlias(alias) => assert_eq!(alias.array, Some(ArraySpec::Fixed(0))),
        other => panic!("expected type alias, got {:?}", other),
    }
}

#[test]
fn test_end_may_close_file_without_newline() {
    let parsed = parse_text("e.speak", "enum E\n    1: A\nend");
    assert!(parsed.is_ok(), "{:?}", parsed.diagnostics);
    assert_eq!(parsed.file.declarations.len(), 1);
}

#[test]
fn test_second_package_overrides_first() {
    let parsed = parse_text("p.speak", "package one\npackage two\n");
    assert!(parsed.is_ok());
    assert_eq!(parsed.file.package.as_deref(), Some("two"));
    assert_eq!(parsed.file.declarations.len(), 2);
}

#[test]
fn test_uppercase_field_name_is_reported_once() {
    let parsed = parse_text("test.speak", "message M\n    1: Id uint32\n    2: name string\nend\n");
    assert_eq!(parsed.diagnostics.len(), 1);
    let diag = &parsed.diagnostics[0];
    assert!(diag.message.starts_with("expected lowercase identifier"), "{}", diag.message);
    assert_eq!((diag.line, diag.column), (2, 8));
    assert_eq!(
        diag.to_string(),
        "test.speak:2:8: error: expected lowercase identifier, found \"Id\""
    );

    // The following field is still parsed.
    match &parsed.file.declarations[0] {
        Declaration::Message(message) => {
            assert_eq!(message.fields.len(), 1);
            assert_eq!(message.fields[0].name, "name");
            assert_eq!(message.fields[0].type_, FieldType::Basic(BasicType::String));
        }
        other => panic!("expected message, got {:?}", other),
    }
}

#[test]
fn test_unterminated_block() {
    assert_eq!(
        messages("enum Color\n    1: Red\n"),
        vec!["test.speak:3:1: error: expected \"end\" to close enum \"Color\", found \"<eof>\""]
    );
}

#[test]
fn test_block_interrupted_by_declaration() {
    let parsed = parse_text("test.speak", "message A\n    1: x uint8\nmessage B\nend\n");
    assert_eq!(parsed.diagnostics.len(), 1);
    assert_eq!(
        parsed.diagnostics[0].message,
        "expected \"end\" to close message \"A\", found \"message\""
    );
    assert_eq!(parsed.file.declarations.len(), 1);
    assert_eq!(parsed.file.declarations[0].name(), "B");
}

#[test]
fn test_lexical_error_is_fatal_and_reported_once() {
    let text = "enum Color\n    1: Red\n    2: 0123\nend\nmessage M\n    1: Bad x\nend\n";
    assert_eq!(
        messages(text),
        vec!["test.speak:3:8: error: bad number syntax: \"0123\""]
    );

    assert_eq!(
        messages("type A uint8\ntype B @\n"),
        vec!["test.speak:2:8: error: unrecognized character: U+0040 '@'"]
    );
}

#[test]
fn test_independent_errors_in_one_pass() {
    let text = "type lower uint8\n\
                enum Color\n    1: red\nend\n\
                message M\n    1: x []\nend\n\
                choice C\n    1: lowercase\nend\n";
    let parsed = parse_text("test.speak", text);
    let got: Vec<String> = parsed.diagnostics.iter().map(|d| d.to_string()).collect();
    assert_eq!(
        got,
        vec![
            "test.speak:1:6: error: expected capitalized identifier, found \"lower\"",
            "test.speak:3:8: error: expected capitalized identifier, found \"red\"",
            "test.speak:6:12: error: expected <identifier>, found \"<eol>\"",
            "test.speak:9:8: error: expected capitalized identifier, found \"lowercase\"",
        ]
    );
    let names: Vec<&str> = parsed.file.declarations.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["Color", "M", "C"]);
}

#[test]
fn test_broken_header_still_checks_body() {
    let got = messages("enum color\n    1: red\nend\ntype Ok uint8\n");
    assert_eq!(
        got,
        vec![
            "test.speak:1:6: error: expected capitalized identifier, found \"color\"",
            "test.speak:2:8: error: expected capitalized identifier, found \"red\"",
        ]
    );
}

#[test]
fn test_broken_header_closed_block_keeps_next_line() {
    let parsed = parse_text("test.speak", "enum color\nend\ngarbage\ntype Ok uint8\n");
    let got: Vec<String> = parsed.diagnostics.iter().map(|d| d.to_string()).collect();
    assert_eq!(
        got,
        vec![
            "test.speak:1:6: error: expected capitalized identifier, found \"color\"",
            "test.speak:3:1: error: unexpected token \"garbage\"",
        ]
    );
    let names: Vec<&str> = parsed.file.declarations.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["Ok"]);
}

#[test]
fn test_carriage_return_line_endings() {
    assert!(parse_text("test.speak", "package p\rmessage M\r    1: id uint32\rend\r").is_ok());
    assert_eq!(
        messages("message M\r    1: Id uint32\rend\r"),
        vec!["test.speak:2:8: error: expected lowercase identifier, found \"Id\""]
    );
}

#[test]
fn test_zero_tag_accepted() {
    let parsed = parse_text("test.speak", "enum E\n    0: A\nend\n");
    assert!(parsed.is_ok(), "{:?}", parsed.diagnostics);
    match &parsed.file.declarations[0] {
        Declaration::Enum(e) => assert_eq!(e.fields[0].tag, 0),
        other => panic!("expected enum, got {:?}", other),
    }
}

#[test]
fn test_unexpected_top_level_tokens() {
    let parsed = parse_text("test.speak", "garbage here\nend\npackage p\n");
    let got: Vec<String> = parsed.diagnostics.iter().map(|d| d.to_string()).collect();
    assert_eq!(
        got,
        vec![
            "test.speak:1:1: error: unexpected token \"garbage\"",
            "test.speak:2:1: error: unexpected token \"end\"",
        ]
    );
    assert_eq!(parsed.file.package.as_deref(), Some("p"));
}

#[test]
fn test_type_shape_errors() {
    assert_eq!(
        messages("type Foo Bar\n"),
        vec!["test.speak:1:10: error: expected basic type, found \"Bar\""]
    );
    assert_eq!(
        messages("message M\n    1: color color\nend\n"),
        vec!["test.speak:2:14: error: expected capitalized identifier, found \"color\""]
    );
    assert_eq!(
        messages("message M\n    1: id msg.id\nend\n"),
        vec!["test.speak:2:15: error: expected capitalized identifier, found \"id\""]
    );
    assert_eq!(
        messages("enum E\n    1 Red\nend\n"),
        vec!["test.speak:2:7: error: expected \":\", found \"Red\""]
    );
    assert_eq!(
        messages("enum E\n    4294967296: Big\nend\n"),
        vec!["test.speak:2:5: error: number out of range, found \"4294967296\""]
    );
    assert_eq!(
        messages("package p"),
        vec!["test.speak:1:10: error: expected <eol>, found \"<eof>\""]
    );
}

#[test]
fn test_into_result() {
    let ok = parse_text("ok.speak", "type A uint8\n").into_result();
    assert!(matches!(ok, Ok(ref file) if file.declarations.len() == 1));

    let err = parse_text("bad.speak", "type a uint8\n").into_result();
    match err {
        Err(SpeakError::Rejected { file, diagnostics }) => {
            assert_eq!(file, "bad.speak");
            assert_eq!(diagnostics.len(), 1);
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[test]
fn test_parse_file() {
    let path = std::env::temp_dir().join(format!("speak_parse_file_{}.speak", std::process::id()));
    std::fs::write(&path, "package disk\ntype Id uint64\n").unwrap();
    let parsed = parse_file(&path);
    std::fs::remove_file(&path).unwrap();

    assert!(parsed.is_ok(), "{:?}", parsed.diagnostics);
    assert_eq!(parsed.file.name, path.display().to_string());
    assert_eq!(parsed.file.package.as_deref(), Some("disk"));
}

#[test]
fn test_parse_missing_file() {
    let parsed = parse_file("/nonexistent/speak/missing.speak");
    assert_eq!(parsed.diagnostics.len(), 1);
    assert_eq!(parsed.diagnostics[0].file, "/nonexistent/speak/missing.speak");
    assert!(parsed.file.declarations.is_empty());
}
