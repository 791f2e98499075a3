//! Java method template around the generated fragments.
//!
//! The fragments are spliced in verbatim; this module only adds the fixed
//! scaffolding (statement preparation, the position local, `execute()`).
use crate::codegen::CallableFragments;
use crate::codegen::ir::Expr;
use crate::codegen::render::{JavaWriter, render_expr};
use crate::config::GenOptions;
use crate::model::UnitOutput;
use crate::naming::{camel_case, constant_case};
use crate::signature::CallableSignature;

const IMPORTS: &[&str] = &[
    "java.sql.CallableStatement",
    "java.sql.Connection",
    "java.sql.ResultSet",
    "java.sql.SQLException",
    "java.sql.Types",
    "java.util.*",
];

/// `SAVE_PERSON_CALL`
pub fn call_constant(sig: &CallableSignature) -> String {
    format!("{}_CALL", constant_case(&sig.call_name()))
}

pub fn method_name(sig: &CallableSignature) -> String {
    camel_case(&sig.call_name())
}

pub fn render_method(w: &mut JavaWriter, sig: &CallableSignature, fragments: &CallableFragments, opts: &GenOptions) {
    let constant = call_constant(sig);
    w.line(&format!(
        "private static final String {constant} = {};",
        render_expr(&Expr::Str(fragments.call_string.clone()))
    ));
    w.line("");

    let return_type = sig.returns.as_ref().map(|ty| ty.java_type()).unwrap_or_else(|| "void".to_string());
    let params = std::iter::once("Connection connection".to_string())
        .chain(sig.params.iter().map(|p| format!("{} {}", p.ty.java_type(), p.name)))
        .collect::<Vec<_>>()
        .join(", ");
    let stmt = &opts.statement_var;

    w.line(&format!("public {return_type} {}({params}) throws SQLException {{", method_name(sig)));
    w.nested(|w| {
        w.line(&format!("try (CallableStatement {stmt} = connection.prepareCall({constant})) {{"));
        w.nested(|w| {
            w.line(&format!("int {} = 1;", opts.position_var));
            w.text(&fragments.binds);
            w.text(&fragments.registrations);
            w.line(&format!("{stmt}.execute();"));
            w.text(&fragments.extraction);
            if let Some(expr) = &fragments.return_expr {
                w.line(&format!("return {expr};"));
            }
        });
        w.line("}");
    });
    w.line("}");
}

/// One Java class per unit. Failed callables are left as a comment so the
/// rest of the class still compiles.
pub fn render_unit(output: &UnitOutput<'_>, opts: &GenOptions) -> String {
    let mut w = JavaWriter::new();
    for import in IMPORTS {
        w.line(&format!("import {import};"));
    }
    w.line("");
    w.line(&format!("public class {} {{", output.unit.name));
    w.nested(|w| {
        for (sig, result) in &output.results {
            w.line("");
            match result {
                Ok(fragments) => render_method(w, sig, fragments, opts),
                Err(err) => w.line(&format!("// skipped: {err}")),
            }
        }
    });
    w.line("}");
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use pretty_assertions::assert_eq;

    const MODEL: &str = r#"{
        "classes": [
            {
                "name": "com.acme.Member",
                "kind": "record",
                "fields": [ { "name": "firstName", "type": "java.lang.String" } ],
                "methods": [ { "name": "firstName" } ]
            }
        ],
        "units": [
            {
                "name": "MemberDao",
                "package": "hr",
                "callables": [
                    {
                        "name": "find_member",
                        "kind": "function",
                        "params": [ { "name": "id", "type": "long" } ],
                        "returns": "com.acme.Member",
                        "outputs": [ { "name": "member" } ]
                    },
                    { "name": "broken", "kind": "procedure", "outputs": [ { "name": "x" } ] }
                ]
            }
        ]
    }"#;

    #[test]
    fn renders_a_class_with_one_method_per_callable() {
        let model = Model::from_json_str(MODEL).unwrap();
        let outputs = model.generate();
        let java = render_unit(&outputs[0], &model.options);
        let expected = r#"import java.sql.CallableStatement;
import java.sql.Connection;
import java.sql.ResultSet;
import java.sql.SQLException;
import java.sql.Types;
import java.util.*;

public class MemberDao {

    private static final String FIND_MEMBER_CALL = "{ ? = call hr.find_member(id => ?) }";

    public Member findMember(Connection connection, Long id) throws SQLException {
        try (CallableStatement stmt = connection.prepareCall(FIND_MEMBER_CALL)) {
            int idx = 1;
            stmt.setObject(++idx, id);
            stmt.registerOutParameter(1, Types.REF_CURSOR);
            stmt.execute();
            Member member = null;
            try (ResultSet rs = (ResultSet) stmt.getObject(1)) {
                while (rs != null && rs.next()) {
                    member = new Member(rs.getString("first_name"));
                }
            }
            return member;
        }
    }

    // skipped: callable `broken`: cardinality mismatch: 1 output(s) declared for a void return
}
"#;
        assert_eq!(java, expected);
    }

    #[test]
    fn names_follow_the_call_name() {
        let sig: CallableSignature = serde_json::from_str(
            r#"{ "name": "save_person", "kind": "procedure", "suffix": "v2" }"#,
        )
        .unwrap();
        assert_eq!(method_name(&sig), "savePersonV2");
        assert_eq!(call_constant(&sig), "SAVE_PERSON_V2_CALL");
    }
}
