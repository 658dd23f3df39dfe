use super::layout;
use crate::auth::Flash;

/// Login form
pub fn login_page(flashes: &[Flash]) -> String {
    layout(
        "Login",
        flashes,
        "<div class=\"card\">\n<h1>Admin login</h1>\n\
         <form method=\"post\" action=\"/login\">\n\
         <label for=\"password\">Password</label>\n\
         <input type=\"password\" id=\"password\" name=\"password\" required autofocus>\n\
         <button type=\"submit\">Log in</button>\n\
         </form>\n</div>",
    )
}
