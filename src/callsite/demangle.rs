use backtrace::BacktraceSymbol;

pub const UNKNOWN: &str = "<unknown>";

/// Frames belonging to the table itself, which are never the call site.
const IGNORE_LIST: &[&str] = &[
    "leakanalyzer::callsite::demangle::caller_name",
    "leakanalyzer::callsite::CallSiteTable::track",
];

/// Get the name of the first function in the call stack, which belongs to one of `modules`.
pub fn caller_name(modules: &[&str]) -> Option<String> {
    let bt = backtrace::Backtrace::new();
    let caller = find_caller(&bt, modules)?;

    symbol_name(caller)
}

/// Find the innermost frame whose name starts with one of the modules.
fn find_caller<'a>(
    backtrace: &'a backtrace::Backtrace,
    modules: &[&str],
) -> Option<&'a BacktraceSymbol> {
    backtrace.frames().iter().find_map(|frame| {
        let symbol = frame.symbols().first()?;
        let name = symbol.name().map(|name| format!("{name}"))?;

        if IGNORE_LIST.iter().any(|ignore| name.starts_with(*ignore)) {
            return None;
        }

        modules
            .iter()
            .any(|module| name.starts_with(*module))
            .then_some(symbol)
    })
}

/// Get the name of a symbol from a [`BacktraceSymbol`], without the hash suffix.
fn symbol_name(symbol: &BacktraceSymbol) -> Option<String> {
    // strip the last part of `my_crate::b::h3777baf656cd0c35`
    let name = symbol.name().map(|name| format!("{name}"))?;
    let name = match name.rfind("::") {
        Some(pos) => name[..pos].to_string(),
        None => name,
    };

    Some(name)
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_should_get_caller_name() {
        let name = a().expect("caller should be resolved");
        assert!(name.contains("callsite::demangle"));
        assert!(!name.contains("caller_name"));
    }

    #[test]
    fn test_should_not_resolve_foreign_modules() {
        assert!(caller_name(&["surely_not_a_crate_in_this_stack"]).is_none());
    }

    fn a() -> Option<String> {
        b()
    }

    fn b() -> Option<String> {
        c()
    }

    fn c() -> Option<String> {
        caller_name(&["leakanalyzer"])
    }
}
