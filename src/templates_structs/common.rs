use askama::Template;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub errors: Vec<String>,
    pub email: String,
    pub app_name: String,
    pub csrf_token: String,
}
