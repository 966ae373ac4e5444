//! Handler system for command entry points.
//!
//! A command entry point is a plain async function taking the handler object
//! (`Arc<Self>`), the [`CommandEvent`], and one parameter per declared option.
//! [`Handler`] is implemented for every such function with up to 16 option
//! parameters, in the same way Axum implements its handler trait, and
//! [`EntryPoint`] erases the concrete type so descriptors can store it.
//!
//! # Example
//!
//! ```rust,ignore
//! struct Echo;
//!
//! impl Echo {
//!     // No options, no response
//!     async fn ping(self: Arc<Self>, event: CommandEvent) {
//!         let _ = event.reply("pong").await;
//!     }
//!
//!     // Returning a String sends it as the reply
//!     async fn echo(self: Arc<Self>, _event: CommandEvent, text: Option<String>) -> String {
//!         text.unwrap_or_default()
//!     }
//!
//!     // Errors are reported as invocation failures
//!     async fn roll(self: Arc<Self>, _event: CommandEvent, sides: i64) -> Result<String, BoxError> {
//!         if sides < 1 {
//!             return Err("sides must be positive".into());
//!         }
//!         Ok(format!("rolled {}", sides))
//!     }
//! }
//! ```

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::argument::{DeclaredType, FromArgument, InvocationArguments};
use crate::error::{BoxError, InvokeError, InvokeResult};
use crate::event::CommandEvent;

/// Type-erased handler object a command or group owns.
pub type Instance = Arc<dyn Any + Send + Sync>;

// ============================================================================
// HandleResponse - Handle handler return values
// ============================================================================

/// A trait for types that can be returned from an entry point.
#[async_trait]
pub trait HandleResponse: Send {
    /// Acts on the returned value.
    async fn into_response(self, event: &CommandEvent) -> InvokeResult<()>;
}

/// Implementation for `()` - no response needed.
#[async_trait]
impl HandleResponse for () {
    async fn into_response(self, _event: &CommandEvent) -> InvokeResult<()> {
        Ok(())
    }
}

/// Implementation for `String` - sent as a reply to the invoking event.
#[async_trait]
impl HandleResponse for String {
    async fn into_response(self, event: &CommandEvent) -> InvokeResult<()> {
        event.reply(&self).await?;
        Ok(())
    }
}

/// Implementation for `Option<T>` - `None` sends nothing.
#[async_trait]
impl<T: HandleResponse> HandleResponse for Option<T> {
    async fn into_response(self, event: &CommandEvent) -> InvokeResult<()> {
        match self {
            Some(t) => t.into_response(event).await,
            None => Ok(()),
        }
    }
}

/// Implementation for `Result<T, E>` - `Err` becomes [`InvokeError::Handler`].
#[async_trait]
impl<T, E> HandleResponse for Result<T, E>
where
    T: HandleResponse,
    E: Into<BoxError> + Send,
{
    async fn into_response(self, event: &CommandEvent) -> InvokeResult<()> {
        match self {
            Ok(t) => t.into_response(event).await,
            Err(e) => Err(InvokeError::Handler(e.into())),
        }
    }
}

// ============================================================================
// Handler Trait
// ============================================================================

/// An async function usable as a command entry point on receiver `R`.
///
/// Implemented automatically for functions of the shape
/// `FnOnce(Arc<R>, CommandEvent, T1, .., Tn) -> impl Future<Output: HandleResponse>`
/// where each `Ti` implements [`FromArgument`].
#[async_trait]
pub trait Handler<R, T>: Clone + Send + Sync + 'static {
    /// Declared types of the option parameters, in order.
    fn declared_types() -> Vec<DeclaredType>;

    /// Calls the handler.
    async fn call(self, receiver: Arc<R>, args: InvocationArguments) -> InvokeResult<()>;
}

macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
        #[async_trait]
        impl<F, Fut, Res, R, $($ty,)*> Handler<R, ($($ty,)*)> for F
        where
            F: FnOnce(Arc<R>, CommandEvent, $($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: HandleResponse + 'static,
            R: Send + Sync + 'static,
            $( $ty: FromArgument + Send + 'static, )*
        {
            fn declared_types() -> Vec<DeclaredType> {
                vec![$($ty::declared_type(),)*]
            }

            async fn call(self, receiver: Arc<R>, args: InvocationArguments) -> InvokeResult<()> {
                let (event, values) = args.into_parts();
                let mut values = values.into_iter();
                let mut index = 0usize;

                $(
                    let $ty = $ty::from_argument(index, values.next().flatten())?;
                    index += 1;
                )*

                let res = (self)(receiver, event.clone(), $($ty,)*).await;
                res.into_response(&event).await
            }
        }
    };
}

// Generate implementations for 0-16 option parameters
impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14);
impl_handler!(
    T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14, T15
);
impl_handler!(
    T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12, T13, T14, T15, T16
);

// ============================================================================
// EntryPoint - Type-erased handler stored in descriptors
// ============================================================================

type InvokeFuture = BoxFuture<'static, InvokeResult<()>>;
type ErasedCall = Arc<dyn Fn(Instance, InvocationArguments) -> InvokeFuture + Send + Sync>;

/// A type-erased entry point.
///
/// The receiver is supplied at call time as an [`Instance`] and downcast to
/// the type the handler was written for.
#[derive(Clone)]
pub struct EntryPoint {
    name: String,
    receiver: &'static str,
    declared: Vec<DeclaredType>,
    call: ErasedCall,
}

impl EntryPoint {
    /// Erases a handler function.
    pub fn new<R, T, H>(name: impl Into<String>, handler: H) -> Self
    where
        H: Handler<R, T>,
        R: Send + Sync + 'static,
        T: 'static,
    {
        let call: ErasedCall = Arc::new(
            move |instance: Instance, args: InvocationArguments| -> InvokeFuture {
                let handler = handler.clone();
                Box::pin(async move {
                    let receiver =
                        instance
                            .downcast::<R>()
                            .map_err(|_| InvokeError::ReceiverMismatch {
                                expected: type_name::<R>(),
                            })?;
                    handler.call(receiver, args).await
                })
            },
        );

        Self {
            name: name.into(),
            receiver: type_name::<R>(),
            declared: H::declared_types(),
            call,
        }
    }

    /// Returns the method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the receiver type name.
    pub fn receiver(&self) -> &'static str {
        self.receiver
    }

    /// Returns the declared types of the option parameters.
    pub fn declared_types(&self) -> &[DeclaredType] {
        &self.declared
    }

    /// Invokes the handler on `instance`.
    pub async fn invoke(&self, instance: Instance, args: InvocationArguments) -> InvokeResult<()> {
        (self.call)(instance, args).await
    }
}

impl fmt::Debug for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPoint")
            .field("name", &self.name)
            .field("receiver", &self.receiver)
            .field("declared", &self.declared)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::Argument;
    use crate::test_support::prefix_event;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter {
        calls: AtomicUsize,
    }

    impl Counter {
        async fn bump(self: Arc<Self>, _event: CommandEvent) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }

        async fn add(self: Arc<Self>, _event: CommandEvent, by: i64, note: Option<String>) {
            let step = if note.is_some() { by * 10 } else { by };
            self.calls.fetch_add(step as usize, Ordering::SeqCst);
        }

        async fn fail(self: Arc<Self>, _event: CommandEvent) -> Result<(), BoxError> {
            Err("boom".into())
        }
    }

    #[test]
    fn test_declared_types_from_signature() {
        let entry = EntryPoint::new("add", Counter::add);
        assert_eq!(
            entry.declared_types(),
            &[DeclaredType::Integer, DeclaredType::String]
        );
        assert!(entry.receiver().ends_with("Counter"));
    }

    #[tokio::test]
    async fn test_invoke_binds_positionally() {
        let counter = Arc::new(Counter::default());
        let instance: Instance = counter.clone();

        let entry = EntryPoint::new("add", Counter::add);
        let args = InvocationArguments::new(prefix_event(), vec![Some(Argument::Integer(2)), None]);
        entry.invoke(Arc::clone(&instance), args).await.unwrap();
        assert_eq!(counter.calls.load(Ordering::SeqCst), 2);

        let args = InvocationArguments::new(
            prefix_event(),
            vec![Some(Argument::Integer(1)), Some(Argument::String("x".into()))],
        );
        entry.invoke(instance, args).await.unwrap();
        assert_eq!(counter.calls.load(Ordering::SeqCst), 12);
    }

    #[tokio::test]
    async fn test_missing_required_argument() {
        let counter = Arc::new(Counter::default());
        let entry = EntryPoint::new("add", Counter::add);
        let args = InvocationArguments::new(prefix_event(), vec![]);

        let err = entry.invoke(counter.clone(), args).await.unwrap_err();
        assert!(matches!(err, InvokeError::Argument(_)));
        assert_eq!(counter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_receiver_mismatch() {
        let entry = EntryPoint::new("bump", Counter::bump);
        let wrong: Instance = Arc::new(String::from("not a counter"));
        let args = InvocationArguments::new(prefix_event(), vec![]);

        let err = entry.invoke(wrong, args).await.unwrap_err();
        assert!(matches!(err, InvokeError::ReceiverMismatch { .. }));
    }

    #[tokio::test]
    async fn test_handler_error_is_wrapped() {
        let entry = EntryPoint::new("fail", Counter::fail);
        let args = InvocationArguments::new(prefix_event(), vec![]);

        let err = entry
            .invoke(Arc::new(Counter::default()), args)
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::Handler(_)));
        assert_eq!(err.to_string(), "handler failed: boom");
    }
}
