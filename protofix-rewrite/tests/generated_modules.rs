//! Rewrites of realistic compiler output.

use protofix_rewrite::{ImportRewriter, build_rewrites};
use pretty_assertions::assert_eq;

fn rewriter_for(proto: &str, deps: &[&str]) -> ImportRewriter {
    let mut rewriter = ImportRewriter::new();
    rewriter
        .register_all(&build_rewrites(proto, proto))
        .expect("self edge");
    for dep in deps {
        rewriter
            .register_all(&build_rewrites(proto, dep))
            .expect("dependency edge");
    }
    rewriter
}

const THIS_PB2: &str = r#"# -*- coding: utf-8 -*-
# Generated by the protocol buffer compiler.  DO NOT EDIT!
# source: this.proto
"""Generated protocol buffer code."""
from google.protobuf import descriptor as _descriptor
from google.protobuf import descriptor_pool as _descriptor_pool
from google.protobuf import symbol_database as _symbol_database
from google.protobuf.internal import builder as _builder
# @@protoc_insertion_point(imports)

_sym_db = _symbol_database.Default()


import other_pb2 as other__pb2
from baz import bizz_buzz_pb2 as baz_dot_bizz__buzz__pb2


DESCRIPTOR = _descriptor_pool.Default().AddSerializedFile(b'\n\nthis.proto')

_globals = globals()
_builder.BuildMessageAndEnumDescriptors(DESCRIPTOR, _globals)
"#;

#[test]
fn message_module_imports_become_relative() {
    let rewriter = rewriter_for("this", &["other", "baz/bizz_buzz"]);
    let out = rewriter.rewrite_file("this_pb2.py", THIS_PB2).unwrap();

    let lines: Vec<&str> = out.lines().collect();
    assert!(lines.contains(&"from . import other_pb2 as other__pb2"));
    assert!(lines.contains(&"from .baz import bizz_buzz_pb2 as baz_dot_bizz__buzz__pb2"));
    assert!(!lines.contains(&"import other_pb2 as other__pb2"));

    // everything else is byte for byte the same
    let expected = THIS_PB2
        .replace(
            "import other_pb2 as other__pb2",
            "from . import other_pb2 as other__pb2",
        )
        .replace(
            "from baz import bizz_buzz_pb2",
            "from .baz import bizz_buzz_pb2",
        );
    assert_eq!(out, expected);
}

#[test]
fn rewriting_twice_is_stable() {
    let rewriter = rewriter_for("this", &["other", "baz/bizz_buzz"]);
    let once = rewriter.rewrite(THIS_PB2).unwrap();
    let twice = rewriter.rewrite(&once).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn service_module_imports_its_own_messages() {
    let src = r#"# Generated by the gRPC Python protocol compiler plugin. DO NOT EDIT!
"""Client and server classes corresponding to protobuf-defined services."""
import grpc

import thing1_pb2 as thing1__pb2
import thing2_pb2 as thing2__pb2
import thing_service_pb2 as thing__service__pb2


class ThingServiceStub(object):
    pass
"#;
    let rewriter = rewriter_for("thing_service", &["thing1", "thing2"]);
    let out = rewriter.rewrite(src).unwrap();
    let lines: Vec<&str> = out.lines().collect();

    assert!(lines.contains(&"from . import thing1_pb2 as thing1__pb2"));
    assert!(lines.contains(&"from . import thing2_pb2 as thing2__pb2"));
    assert!(lines.contains(&"from . import thing_service_pb2 as thing__service__pb2"));
    assert!(lines.contains(&"import grpc"));
    assert!(!lines.contains(&"import thing1_pb2 as thing1__pb2"));
}

#[test]
fn stub_imports_of_one_package_collapse_to_one_line() {
    let src = r#""""
@generated by mypy-protobuf.  Do not edit manually!
isort:skip_file
"""
import abc
import grpc
import requests.get_pb2
import requests.post_pb2

class ImportsServiceStub:
    def __init__(self, channel: grpc.Channel) -> None: ...
    Get: grpc.UnaryUnaryMultiCallable[
        requests.get_pb2.GetRequest,
        requests.get_pb2.GetResponse,
    ]
"#;
    let rewriter = rewriter_for("imports_service", &["requests/get", "requests/post"]);
    let out = rewriter.rewrite(src).unwrap();

    assert_eq!(out.matches("from . import requests").count(), 1);
    assert!(!out.contains("import requests.get_pb2"));
    assert!(!out.contains("import requests.post_pb2"));
    assert!(out.contains("requests.get_pb2.GetRequest"));
}

#[test]
fn stub_self_import_is_rewritten() {
    let src = "import abc\nimport grpc\nimport no_imports_service_pb2\n\nclass Stub:\n    x: no_imports_service_pb2.Empty\n";
    let rewriter = rewriter_for("no_imports_service", &[]);
    let out = rewriter.rewrite(src).unwrap();
    let lines: Vec<&str> = out.lines().collect();

    assert!(lines.contains(&"from . import no_imports_service_pb2"));
    assert!(!lines.contains(&"import no_imports_service_pb2"));
}

#[test]
fn hyphenated_proto_names_use_module_spelling() {
    let src = "import grpc\n\nimport imports_service_pb2 as imports__service__pb2\n";
    let rewriter = rewriter_for("imports-service", &[]);
    let out = rewriter.rewrite(src).unwrap();
    assert_eq!(
        out,
        "import grpc\n\nfrom . import imports_service_pb2 as imports__service__pb2\n"
    );
}

#[test]
fn nested_file_reaches_root_dependency() {
    let src = "from google.protobuf import descriptor as _descriptor\nimport thing2_pb2 as thing2__pb2\nfrom a.b.c import thing3_pb2 as a_dot_b_dot_c_dot_thing3__pb2\n";
    let rewriter = rewriter_for("d/thing1", &["thing2", "a/b/c/thing3"]);
    let out = rewriter.rewrite(src).unwrap();
    assert_eq!(
        out,
        "from google.protobuf import descriptor as _descriptor\nfrom .. import thing2_pb2 as thing2__pb2\nfrom ..a.b.c import thing3_pb2 as a_dot_b_dot_c_dot_thing3__pb2\n"
    );
}

#[test]
fn unrelated_absolute_imports_are_left_alone() {
    let src = "from google.protobuf import empty_pb2 as google_dot_protobuf_dot_empty__pb2\nimport ignored_pb2 as ignored__pb2\n";
    let rewriter = rewriter_for("ignored_import", &[]);
    assert_eq!(rewriter.rewrite(src).unwrap(), src);
}
