//! Compiler integration tests.
//!
//! Binds small programs of one or more modules against the builtin modules
//! and checks cross-module resolution and the collected diagnostics.

use bumpalo::Bump;
use spyc_ast::{AstBuilder, CmpOp};
use spyc_binder::BindError;
use spyc_compiler::Compiler;
use spyc_options::{parse_options, BindOptions};
use spyc_types::{ClassFlags, ClassKind, TypeKind};

fn compiler() -> Compiler {
    Compiler::new(BindOptions::default()).unwrap()
}

#[test]
fn test_builtin_modules_are_registered() {
    let compiler = compiler();
    for name in ["builtins", "typing", "typing_extensions", "enum", "dataclasses"] {
        let module = compiler.module(name).unwrap();
        assert!(module.is_finished(), "{}", name);
    }
}

#[test]
fn test_explicit_object_base_matches_implicit() {
    let arena = Bump::new();
    let mut compiler = compiler();
    let b = AstBuilder::new(&arena, compiler.interner().clone());
    let module = b.module(vec![
        b.class_def("A", vec![b.name("object")], vec![], vec![b.pass()]),
        b.class_def("B", vec![], vec![], vec![b.pass()]),
        b.class_def("C", vec![b.name("int")], vec![], vec![b.pass()]),
    ]);
    compiler.bind_module("m", "m.py", &module).unwrap();

    let object = compiler.types().object;
    let a = compiler.resolve_name("m", "A").unwrap();
    let bt = compiler.resolve_name("m", "B").unwrap();
    let c = compiler.resolve_name("m", "C").unwrap();
    let int = compiler.resolve_name("builtins", "int").unwrap();

    assert_eq!(compiler.types().class(a).unwrap().bases, vec![object]);
    assert_eq!(compiler.types().class(bt).unwrap().bases, vec![object]);
    assert_eq!(compiler.types().class(c).unwrap().bases, vec![int]);
    assert!(compiler.diagnostics().is_empty());
}

#[test]
fn test_subclassing_bool_is_a_final_violation() {
    let arena = Bump::new();
    let mut compiler = compiler();
    let b = AstBuilder::new(&arena, compiler.interner().clone());
    let module = b.module(vec![b.class_def("MyBool", vec![b.name("bool")], vec![], vec![b.pass()])]);
    compiler.bind_module("m", "m.py", &module).unwrap();

    let my_bool = compiler.resolve_name("m", "MyBool").unwrap();
    assert!(compiler.types().class(my_bool).is_some());

    let diagnostics = compiler.take_diagnostics();
    assert_eq!(diagnostics.error_count(), 1);
    assert_eq!(
        diagnostics.diagnostics()[0].message_text,
        "Class `m.MyBool` cannot subclass a Final class: `builtins.bool`"
    );
    assert!(compiler.diagnostics().is_empty());
}

#[test]
fn test_dataclass_decorators() {
    let arena = Bump::new();
    let mut compiler = compiler();
    let b = AstBuilder::new(&arena, compiler.interner().clone());
    let frozen = b.call(b.name("dataclass"), vec![], vec![("frozen", b.bool_(true))]);
    let module = b.module(vec![
        b.import_from(Some("dataclasses"), &[("dataclass", None)], 0),
        b.class_def("Plain", vec![], vec![b.name("dataclass")], vec![b.pass()]),
        b.class_def("Frozen", vec![], vec![frozen], vec![b.pass()]),
        b.class_def(
            "Odd",
            vec![],
            vec![b.call(b.name("dataclass"), vec![], vec![("slots", b.bool_(true))])],
            vec![b.pass()],
        ),
    ]);
    compiler.bind_module("m", "m.py", &module).unwrap();

    let plain = compiler.resolve_name("m", "Plain").unwrap();
    let flags = compiler.types().class(plain).unwrap().flags;
    assert!(flags.contains(ClassFlags::DATACLASS));
    assert!(!flags.contains(ClassFlags::FROZEN));

    let frozen = compiler.resolve_name("m", "Frozen").unwrap();
    let flags = compiler.types().class(frozen).unwrap().flags;
    assert!(flags.contains(ClassFlags::DATACLASS | ClassFlags::FROZEN));

    let odd = compiler.resolve_name("m", "Odd").unwrap();
    assert!(compiler.types().is_dynamic(odd));
}

#[test]
fn test_typing_extensions_markers() {
    let arena = Bump::new();
    let mut compiler = compiler();
    let b = AstBuilder::new(&arena, compiler.interner().clone());
    let module = b.module(vec![
        b.import(&[("typing_extensions", Some("te"))]),
        b.class_def("P", vec![b.dotted("te.Protocol")], vec![], vec![b.pass()]),
        b.class_def("F", vec![], vec![b.dotted("te.final")], vec![b.pass()]),
    ]);
    compiler.bind_module("m", "m.py", &module).unwrap();

    let p = compiler.resolve_name("m", "P").unwrap();
    assert!(compiler.types().is_dynamic(p));
    let f = compiler.resolve_name("m", "F").unwrap();
    assert!(compiler.types().is_final(f));
}

#[test]
fn test_cross_module_bases_resolve_through_imports() {
    let arena = Bump::new();
    let mut compiler = compiler();
    let b = AstBuilder::new(&arena, compiler.interner().clone());

    let lib = b.module(vec![
        b.import_from(Some("enum"), &[("Enum", None)], 0),
        b.class_def("Base", vec![], vec![], vec![b.pass()]),
        b.class_def("Color", vec![b.name("Enum")], vec![], vec![b.pass()]),
    ]);
    compiler.bind_module("pkg.lib", "pkg/lib.py", &lib).unwrap();

    let app = b.module(vec![
        b.import_from(Some("pkg.lib"), &[("Base", Some("LibBase")), ("Color", None)], 0),
        b.import(&[("pkg.lib", None)]),
        b.class_def("Derived", vec![b.name("LibBase")], vec![], vec![b.pass()]),
        b.class_def("Mixed", vec![b.name("Base"), b.name("Color")], vec![], vec![b.pass()]),
    ]);
    compiler.bind_module("app", "app.py", &app).unwrap();

    let base = compiler.resolve_name("pkg.lib", "Base").unwrap();
    let derived = compiler.resolve_name("app", "Derived").unwrap();
    assert_eq!(compiler.types().class(derived).unwrap().bases, vec![base]);
    assert_eq!(compiler.resolve_name("app", "LibBase"), Some(base));

    // Only the alias is bound, so `Base` is unknown in `app`.
    let mixed = compiler.resolve_name("app", "Mixed").unwrap();
    assert!(compiler.types().is_dynamic(mixed));

    // `import pkg.lib` binds the top-level package.
    let pkg = compiler.resolve_name("app", "pkg").unwrap();
    assert!(matches!(&compiler.types().get(pkg).kind, TypeKind::Module { name } if name == "pkg"));
}

#[test]
fn test_package_attribute_resolves_to_submodule() {
    let arena = Bump::new();
    let mut compiler = compiler();
    let b = AstBuilder::new(&arena, compiler.interner().clone());

    compiler.bind_module("pkg", "pkg/__init__.py", &b.module(vec![])).unwrap();
    let lib = b.module(vec![
        b.import_from(Some("enum"), &[("Enum", None)], 0),
        b.class_def("Color", vec![b.name("Enum")], vec![], vec![b.pass()]),
    ]);
    compiler.bind_module("pkg.lib", "pkg/lib.py", &lib).unwrap();

    let app = b.module(vec![
        b.import(&[("pkg.lib", None)]),
        b.class_def("Shade", vec![b.dotted("pkg.lib.Color")], vec![], vec![b.pass()]),
    ]);
    compiler.bind_module("app", "app.py", &app).unwrap();

    let color = compiler.resolve_name("pkg.lib", "Color").unwrap();
    let shade = compiler.resolve_name("app", "Shade").unwrap();
    let shade_class = compiler.types().class(shade).unwrap();
    assert_eq!(shade_class.bases, vec![color]);
    assert_eq!(shade_class.kind, ClassKind::Enum);
}

#[test]
fn test_unbound_import_target_degrades() {
    let arena = Bump::new();
    let mut compiler = compiler();
    let b = AstBuilder::new(&arena, compiler.interner().clone());
    let module = b.module(vec![
        b.import_from(Some("missing"), &[("Thing", None)], 0),
        b.class_def("C", vec![b.name("Thing")], vec![], vec![b.pass()]),
    ]);
    compiler.bind_module("m", "m.py", &module).unwrap();

    assert!(compiler.module("m").unwrap().get_import(compiler.interner().intern("Thing")).is_some());
    assert_eq!(compiler.resolve_name("m", "Thing"), None);
    let c = compiler.resolve_name("m", "C").unwrap();
    assert!(compiler.types().is_dynamic(c));
}

#[test]
fn test_rebinding_replaces_module_table() {
    let arena = Bump::new();
    let mut compiler = compiler();
    let b = AstBuilder::new(&arena, compiler.interner().clone());

    let first = b.module(vec![b.class_def("Old", vec![], vec![], vec![])]);
    compiler.bind_module("m", "m.py", &first).unwrap();
    let second = b.module(vec![b.class_def("New", vec![], vec![], vec![])]);
    compiler.bind_module("m", "m.py", &second).unwrap();

    assert!(compiler.resolve_name("m", "Old").is_none());
    assert!(compiler.resolve_name("m", "New").is_some());
}

#[test]
fn test_failed_bind_does_not_register_module() {
    let arena = Bump::new();
    let mut compiler = compiler();
    let b = AstBuilder::new(&arena, compiler.interner().clone());
    let module = b.module(vec![
        b.class_def("A", vec![], vec![], vec![]),
        b.import_from(Some("sibling"), &[("x", None)], 1),
    ]);

    let err = compiler.bind_module("m", "m.py", &module).unwrap_err();
    assert!(matches!(err, BindError::UnsupportedImport { level: 1, .. }));
    assert!(compiler.module("m").is_none());
}

#[test]
fn test_errors_in_one_class_do_not_hide_others() {
    let arena = Bump::new();
    let mut compiler = compiler();
    let b = AstBuilder::new(&arena, compiler.interner().clone());
    let second = b.class_def("Second", vec![b.name("bool")], vec![], vec![]);
    let first = b.class_def("First", vec![b.name("A"), b.name("E")], vec![], vec![]);
    let first_pos = first.data().range.pos;
    let second_pos = second.data().range.pos;
    let module = b.module(vec![
        b.import(&[("enum", None)]),
        b.class_def("A", vec![], vec![], vec![]),
        b.class_def("E", vec![b.dotted("enum.Enum")], vec![], vec![]),
        first,
        second,
        b.class_def("Fine", vec![b.name("A")], vec![], vec![]),
    ]);
    compiler.bind_module("m", "m.py", &module).unwrap();

    let fine = compiler.resolve_name("m", "Fine").unwrap();
    assert!(!compiler.types().is_dynamic(fine));

    let diagnostics = compiler.take_diagnostics();
    let positions: Vec<_> = diagnostics
        .diagnostics()
        .iter()
        .map(|d| d.range.unwrap().pos)
        .collect();
    let mut expected = vec![first_pos, second_pos];
    expected.sort();
    assert_eq!(positions, expected);
}

#[test]
fn test_options_drive_static_conditions() {
    let arena = Bump::new();
    let options = parse_options(r#"{ "targetHexversion": 50987248, "typeCheckingGuards": ["STATIC_ONLY"] }"#).unwrap();
    let mut compiler = Compiler::new(options).unwrap();
    let b = AstBuilder::new(&arena, compiler.interner().clone());
    let module = b.module(vec![
        b.if_(
            b.compare(b.dotted("sys.hexversion"), CmpOp::GtE, b.int(0x030B_0000)),
            vec![b.class_def("Modern", vec![], vec![], vec![])],
            vec![b.class_def("Legacy", vec![], vec![], vec![])],
        ),
        b.if_(b.name("STATIC_ONLY"), vec![b.class_def("Checked", vec![], vec![], vec![])], vec![]),
        b.if_(b.dotted("typing.TYPE_CHECKING"), vec![b.class_def("Typed", vec![], vec![], vec![])], vec![]),
        b.if_(b.name("TYPE_CHECKING"), vec![b.class_def("Maybe", vec![], vec![], vec![])], vec![]),
    ]);
    compiler.bind_module("m", "m.py", &module).unwrap();

    let table = compiler.module("m").unwrap();
    let name = |s: &str| compiler.interner().intern(s);
    assert!(table.get_class(name("Legacy")).is_some());
    assert!(table.get_child(name("Modern")).is_none());
    assert!(table.get_class(name("Checked")).is_some());
    assert!(table.get_class(name("Typed")).is_some());
    assert!(table.get_child(name("Maybe")).is_none());
    assert!(table.is_possible_name(name("Maybe")));
}

#[test]
fn test_resolve_type_in_module() {
    let arena = Bump::new();
    let mut compiler = compiler();
    let b = AstBuilder::new(&arena, compiler.interner().clone());
    let module = b.module(vec![
        b.import(&[("typing", None)]),
        b.class_def("Outer", vec![], vec![], vec![b.class_def("Inner", vec![], vec![], vec![])]),
    ]);
    compiler.bind_module("m", "m.py", &module).unwrap();

    let protocol = compiler.types().protocol;
    assert_eq!(compiler.resolve_type("m", &b.dotted("typing.Protocol")), Some(protocol));
    let none_type = compiler.types().none_type;
    assert_eq!(compiler.resolve_type("m", &b.none()), Some(none_type));

    let inner = compiler.resolve_type("m", &b.dotted("Outer.Inner")).unwrap();
    assert_eq!(compiler.types().class(inner).unwrap().name.qualname, "Outer.Inner");

    assert_eq!(compiler.resolve_type("m", &b.name("nowhere")), None);
    assert_eq!(compiler.resolve_type("unbound", &b.name("object")), None);
}
