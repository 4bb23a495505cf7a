//! HTTP status codes as a typed enum.
//!
//! Use [`Status`] anywhere a status code is accepted: `Response::status()`,
//! `Response::builder().status()`, or as a bare handler return value.
//!
//! ```rust
//! use waypost::{Params, Request, Response, Status};
//!
//! // status-only, no body
//! Response::status(Status::NoContent);
//!
//! // return Status directly from a handler
//! async fn delete_user(_req: Request, _params: Params) -> Status {
//!     Status::NoContent
//! }
//! ```

/// The status codes handlers commonly answer with.
///
/// 404, 405 and 500 belong to [`ErrorKind`](crate::ErrorKind), which renders
/// them through the error page. Other codes can still be sent through
/// [`ResponseBuilder::code`](crate::ResponseBuilder::code).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Ok,                  // 200
    Created,             // 201
    NoContent,           // 204
    MovedPermanently,    // 301
    SeeOther,            // 303
    BadRequest,          // 400
    Unauthorized,        // 401
    Forbidden,           // 403
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Self::Ok               => 200,
            Self::Created          => 201,
            Self::NoContent        => 204,
            Self::MovedPermanently => 301,
            Self::SeeOther         => 303,
            Self::BadRequest       => 400,
            Self::Unauthorized     => 401,
            Self::Forbidden        => 403,
        }
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        s.code()
    }
}
