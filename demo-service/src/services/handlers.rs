//! Service definitions
//!
//! Each constructor returns an undecorated [`Service`]; callers decorate it
//! with the runtime of their choice.

use super::{AppContext, Session};
use service_trace::prelude::*;
use std::time::Duration;

// =============================================================================
// Argument helpers
// =============================================================================

// Arguments reach the operations already coerced by their schemas.

fn number(args: &[Value], index: usize) -> f64 {
    args.get(index).and_then(Value::as_f64).unwrap_or_default()
}

fn id(args: &[Value], index: usize) -> Result<u32, OperationError> {
    args.get(index)
        .and_then(Value::as_i64)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| OperationError::bad_request("id must be a positive integer"))
}

fn text(args: &[Value], index: usize) -> String {
    args.get(index)
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

// =============================================================================
// Calculator
// =============================================================================

fn operand_schema() -> ObjectSchema {
    ObjectSchema::new()
        .field("a", FieldRule::number().required())
        .field("b", FieldRule::number().required())
}

/// Synchronous arithmetic operations.
pub fn calculator_service() -> Service {
    Service::new("calculator")
        .operation(
            "add",
            Operation::sync(|args| Ok(Value::from(number(&args, 0) + number(&args, 1))))
                .with_params(["a", "b"])
                .with_schema(operand_schema()),
        )
        .operation(
            "subtract",
            Operation::sync(|args| Ok(Value::from(number(&args, 0) - number(&args, 1))))
                .with_params(["a", "b"])
                .with_schema(operand_schema()),
        )
        .operation(
            "divide",
            Operation::sync(|args| {
                let divisor = number(&args, 1);
                if divisor == 0.0 {
                    return Err(OperationError::bad_request("division by zero"));
                }
                Ok(Value::from(number(&args, 0) / divisor))
            })
            .with_params(["a", "b"])
            .with_schema(operand_schema()),
        )
        .operation(
            "sum",
            Operation::sync(|args| {
                let total: f64 = args.iter().filter_map(Value::as_f64).sum();
                Ok(Value::from(total))
            }),
        )
}

// =============================================================================
// Users
// =============================================================================

/// Deferred operations over the user store.
pub fn users_service(ctx: AppContext) -> Service {
    let get_ctx = ctx.clone();
    let list_ctx = ctx.clone();
    let create_ctx = ctx.clone();
    let login_ctx = ctx.clone();
    let delete_ctx = ctx;

    Service::new("users")
        .operation(
            "get",
            Operation::deferred(move |args| {
                let db = get_ctx.db.clone();
                async move {
                    let id = id(&args, 0)?;
                    db.get_user(id)
                        .await
                        .ok_or_else(|| OperationError::not_found(format!("user {} not found", id)))?
                        .to_value()
                }
            })
            .with_params(["id"])
            .with_schema(ObjectSchema::new().field("id", FieldRule::integer().required().min(1.0))),
        )
        .operation(
            "list",
            Operation::deferred(move |args| {
                let db = list_ctx.db.clone();
                async move {
                    let limit = args.first().and_then(Value::as_i64).unwrap_or(i64::MAX);
                    let users = db.list_users().await;
                    let items = users
                        .iter()
                        .take(usize::try_from(limit).unwrap_or(usize::MAX))
                        .map(|u| u.to_value())
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok::<_, OperationError>(Value::array(items))
                }
            })
            .with_params(["limit"])
            .with_schema(ObjectSchema::new().field("limit", FieldRule::integer().min(0.0))),
        )
        .operation(
            "create",
            Operation::deferred(move |args| {
                let db = create_ctx.db.clone();
                async move {
                    let user = db
                        .create_user(&text(&args, 0), &text(&args, 1), &text(&args, 2))
                        .await?;
                    user.to_value()
                }
            })
            .with_params(["name", "email", "password"])
            .with_schema(
                ObjectSchema::new()
                    .field("name", FieldRule::string().required().min_length(1).max_length(64))
                    .field("email", FieldRule::string().required().pattern(r"^[^@\s]+@[^@\s]+$"))
                    .field("password", FieldRule::string().required().min_length(6)),
            ),
        )
        .operation(
            "login",
            Operation::deferred(move |args| {
                let db = login_ctx.db.clone();
                async move {
                    // Simulated credential check latency.
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    let user = db
                        .authenticate(&text(&args, 0), &text(&args, 1))
                        .await
                        .ok_or_else(|| OperationError::forbidden("invalid credentials"))?;
                    Session::new(user.id).to_value()
                }
            })
            .with_params(["email", "password"])
            .with_remove_output(true)
            .with_schema(
                ObjectSchema::new()
                    .field("email", FieldRule::string().required())
                    .field("password", FieldRule::string().required()),
            ),
        )
        .operation(
            "delete",
            Operation::deferred(move |args| {
                let db = delete_ctx.db.clone();
                async move {
                    let id = id(&args, 0)?;
                    if db.delete_user(id).await {
                        Ok(Value::from(true))
                    } else {
                        Err(OperationError::not_found(format!("user {} not found", id)))
                    }
                }
            })
            .with_params(["id"])
            .with_schema(ObjectSchema::new().field("id", FieldRule::integer().required())),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_script;

    fn decorated(mut service: Service) -> Service {
        service.decorate(&Runtime::new());
        service
    }

    #[tokio::test]
    async fn test_calculator_coerces_text() {
        let calculator = decorated(calculator_service());
        let sum = calculator
            .call_async("add", vec!["1".into(), "2".into()])
            .await
            .unwrap();
        assert_eq!(sum.as_f64(), Some(3.0));
    }

    #[tokio::test]
    async fn test_calculator_rejects_bad_operand() {
        let calculator = decorated(calculator_service());
        let err = calculator
            .call("subtract", vec!["x".into(), 1.into()])
            .into_ready()
            .unwrap()
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_sum_takes_any_number_of_args() {
        let calculator = decorated(calculator_service());
        let total = calculator
            .call_async("sum", vec![1.into(), 2.into(), 3.5.into()])
            .await
            .unwrap();
        assert_eq!(total.as_f64(), Some(6.5));
    }

    #[tokio::test]
    async fn test_user_lifecycle() {
        let users = decorated(users_service(AppContext::new()));

        let created = users
            .call_async(
                "create",
                vec!["Dan".into(), "dan@example.com".into(), "hunter22".into()],
            )
            .await
            .unwrap();
        let id = created.get("id").and_then(|v| v.as_i64()).unwrap();

        let session = users
            .call_async("login", vec!["dan@example.com".into(), "hunter22".into()])
            .await
            .unwrap();
        assert_eq!(session.get("userId").and_then(|v| v.as_i64()), Some(id));

        let deleted = users.call_async("delete", vec![id.into()]).await.unwrap();
        assert_eq!(deleted, Value::from(true));

        let err = users.call_async("get", vec![id.into()]).await.unwrap_err();
        assert_eq!(err.as_operation().map(|e| e.code), Some(ErrorCode::NotFound));
    }

    #[tokio::test]
    async fn test_create_validates_email() {
        let users = decorated(users_service(AppContext::new()));
        let outcome = users.call("create", vec!["Eve".into(), "nope".into(), "longenough".into()]);
        assert!(outcome.is_deferred());
        let err = outcome.await.unwrap_err();
        assert_eq!(err.as_validation().map(|e| e.field.as_str()), Some("email"));
    }

    #[tokio::test]
    async fn test_list_respects_limit() {
        let users = decorated(users_service(AppContext::new()));
        let list = users.call_async("list", vec![1.into()]).await.unwrap();
        assert_eq!(list.len(), Some(1));
        let all = users.call_async("list", vec![]).await.unwrap();
        assert_eq!(all.len(), Some(2));
    }

    #[tokio::test]
    async fn test_script_transcript() {
        let transcript = run_script(&Runtime::new()).await;
        assert_eq!(transcript.len(), 9);
        assert_eq!(transcript[0], "calculator.add -> 3.0");
        assert!(transcript[2].contains("division by zero"));
        assert!(transcript[3].contains("must be a number"));
        assert!(transcript[5].contains("NOT_FOUND"));
    }
}
