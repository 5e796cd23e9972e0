//! Logging interceptor for call observation.

use patchwork_core::{BoxError, Intercept, InvocationContext};
use std::borrow::Cow;

/// An interceptor that logs each invocation at debug level.
#[derive(Debug, Clone, Default)]
pub struct LoggingInterceptor {
    label: Option<Cow<'static, str>>,
}

impl LoggingInterceptor {
    /// Log under the patched function's own name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log under `label` instead of the function name.
    pub fn named(label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }
}

impl Intercept for LoggingInterceptor {
    fn intercept(&self, context: &mut InvocationContext<'_>) -> Result<(), BoxError> {
        let function = self
            .label
            .as_deref()
            .unwrap_or_else(|| context.original().name());
        tracing::debug!(
            function,
            kind = ?context.kind(),
            arguments = context.arguments().len(),
            "intercepted call"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchwork_core::{Function, Invocation, Value};

    #[test]
    fn test_logging_is_transparent() {
        let original = Function::new("sum", |inv| Ok(inv.arg(0)));
        let args = [Value::from(1)];
        let this = Value::Null;
        let mut context = InvocationContext::new(&original, Invocation::call(&this, &args));

        LoggingInterceptor::named("custom").intercept(&mut context).unwrap();
        LoggingInterceptor::new().intercept(&mut context).unwrap();

        assert!(!context.default_prevented());
        assert!(!context.return_value_set());
        assert_eq!(context.call_original(), Ok(Value::from(1)));
    }
}
