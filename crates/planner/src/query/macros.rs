#[macro_export]
macro_rules! value {
    ($val:expr) => {
        $crate::query::ast::expr::Expr::Value(::model::core::value::Value::from($val))
    };
}

#[macro_export]
macro_rules! table_ref {
    ($name:expr) => {
        $crate::query::ast::common::TableRef {
            schema: None,
            name: $name.to_string(),
        }
    };
    ($schema:expr, $name:expr) => {
        $crate::query::ast::common::TableRef {
            schema: Some($schema.to_string()),
            name: $name.to_string(),
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::query::ast::{common::TableRef, expr::Expr};
    use model::core::value::Value;

    #[test]
    fn test_value_macro_converts() {
        assert_eq!(value!(5), Expr::Value(Value::Int(5)));
        assert_eq!(value!("a"), Expr::Value(Value::String("a".to_string())));
    }

    #[test]
    fn test_table_ref_macro() {
        assert_eq!(
            table_ref!("public", "owner"),
            TableRef {
                schema: Some("public".to_string()),
                name: "owner".to_string(),
            }
        );
        assert_eq!(table_ref!("owner").schema, None);
    }
}
