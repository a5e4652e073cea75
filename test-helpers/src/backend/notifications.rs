use actix_web::{HttpRequest, HttpResponse, get, patch, web};
use payloads::{NotificationId, RoleId, responses::NotificationList};

use super::{BackendError, BackendState, authenticate};

#[tracing::instrument(skip(req, state), fields(user_id))]
#[get("/notifications")]
pub async fn list_notifications(
    req: HttpRequest,
    state: web::Data<BackendState>,
) -> Result<HttpResponse, BackendError> {
    let user = authenticate(&req, &state)?;
    if user.role_id != RoleId::HR {
        return Err(BackendError::Forbidden);
    }
    let inner = state.lock();
    let notifications = inner.hr_notifications.clone();
    let body = if inner.bare_hr_list {
        NotificationList::Bare(notifications)
    } else {
        NotificationList::Wrapped { notifications }
    };
    Ok(HttpResponse::Ok().json(body))
}

#[tracing::instrument(skip(req, state), fields(user_id))]
#[get("/notifications/employee/{employee_id}")]
pub async fn list_employee_notifications(
    req: HttpRequest,
    employee_id: web::Path<String>,
    state: web::Data<BackendState>,
) -> Result<HttpResponse, BackendError> {
    let user = authenticate(&req, &state)?;
    let employee_id = employee_id.into_inner();
    if user.role_id != RoleId::HR && user.id != employee_id {
        return Err(BackendError::Forbidden);
    }
    let notifications = state
        .lock()
        .employee_notifications
        .get(&employee_id)
        .cloned()
        .unwrap_or_default();
    Ok(HttpResponse::Ok().json(notifications))
}

#[tracing::instrument(skip(req, state), fields(user_id))]
#[patch("/notifications/{notification_id}/read")]
pub async fn mark_read(
    req: HttpRequest,
    notification_id: web::Path<String>,
    state: web::Data<BackendState>,
) -> Result<HttpResponse, BackendError> {
    authenticate(&req, &state)?;
    let notification_id = NotificationId(notification_id.into_inner());
    let mut inner = state.lock();
    if inner.failing_reads.contains(&notification_id) {
        return Err(BackendError::Injected);
    }
    let mut found = false;
    for notification in inner.all_notifications_mut() {
        if notification.id == notification_id {
            notification.read = true;
            found = true;
        }
    }
    if !found {
        return Err(BackendError::NotFound);
    }
    Ok(HttpResponse::NoContent().finish())
}
