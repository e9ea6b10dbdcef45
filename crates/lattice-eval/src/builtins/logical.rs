use lattice_common::{ErrorKind, Value};

use crate::interpreter::ArgumentHandle;

/// `IF(condition, then, else)` evaluates only the branch it takes — `else`
/// defaults to `FALSE` when omitted, matching the two-argument form.
pub fn if_fn(args: &[ArgumentHandle]) -> Value {
    let Some(cond) = args.first() else {
        return Value::Error(ErrorKind::Value);
    };

    let cond_value = cond.value();
    if cond_value.is_error() {
        return cond_value;
    }
    let cond_bool = match cond_value.to_bool() {
        Ok(b) => b,
        Err(e) => return Value::Error(e),
    };

    if cond_bool {
        match args.get(1) {
            Some(then) => then.value(),
            None => Value::Bool(true),
        }
    } else {
        match args.get(2) {
            Some(else_branch) => else_branch.value(),
            None => Value::Bool(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ValueResolver;
    use lattice_parse::parse;
    use std::cell::RefCell;

    /// A resolver that records every cell it's asked for, to prove the
    /// untaken branch of IF never triggers resolution.
    struct TracingResolver {
        touched: RefCell<Vec<String>>,
    }

    impl ValueResolver for TracingResolver {
        fn current_sheet(&self) -> &str {
            "Sheet1"
        }
        fn cell_value(&self, sheet: &str, cell: lattice_common::CellId) -> Value {
            self.touched.borrow_mut().push(lattice_common::fqk(sheet, cell));
            match lattice_common::fqk(sheet, cell).as_str() {
                "Sheet1!A1" => Value::Number(1.0),
                "Sheet1!B1" => Value::Number(2.0),
                _ => Value::Empty,
            }
        }
    }

    #[test]
    fn if_skips_untaken_branch() {
        let resolver = TracingResolver { touched: RefCell::new(Vec::new()) };
        let ast = parse("=IF(TRUE,A1,B1)").unwrap();
        let v = crate::interpreter::evaluate(&ast, &resolver);
        assert_eq!(v, Value::Number(1.0));
        assert_eq!(resolver.touched.borrow().as_slice(), ["Sheet1!A1"]);
    }

    #[test]
    fn if_false_takes_else_branch() {
        let resolver = TracingResolver { touched: RefCell::new(Vec::new()) };
        let ast = parse("=IF(FALSE,A1,B1)").unwrap();
        let v = crate::interpreter::evaluate(&ast, &resolver);
        assert_eq!(v, Value::Number(2.0));
        assert_eq!(resolver.touched.borrow().as_slice(), ["Sheet1!B1"]);
    }

    #[test]
    fn if_false_without_else_is_false() {
        let resolver = TracingResolver { touched: RefCell::new(Vec::new()) };
        let ast = parse("=IF(FALSE,A1)").unwrap();
        assert_eq!(crate::interpreter::evaluate(&ast, &resolver), Value::Bool(false));
    }

    #[test]
    fn if_propagates_condition_error() {
        let resolver = TracingResolver { touched: RefCell::new(Vec::new()) };
        let ast = parse("=IF(1/0,A1,B1)").unwrap();
        assert_eq!(
            crate::interpreter::evaluate(&ast, &resolver),
            Value::Error(ErrorKind::Div0)
        );
        assert!(resolver.touched.borrow().is_empty());
    }
}
