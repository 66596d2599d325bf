use std::collections::HashMap;

use mysql_async::OptsBuilder;

use crate::config::ConnectOptions;
use crate::dsn::Dsn;

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Native connection options for a DSN. The charset and any extra init statements run on
/// every fresh handle.
#[must_use]
pub fn build_opts(dsn: &Dsn, options: &ConnectOptions) -> OptsBuilder {
    let builder = OptsBuilder::default()
        .ip_or_hostname(dsn.host_or_default())
        .tcp_port(dsn.port_or_default())
        .user(non_empty(&dsn.user))
        .pass(non_empty(&dsn.password))
        .db_name(non_empty(&dsn.database))
        .init(options.session_init_statements());

    if options.attributes.is_empty() {
        builder
    } else {
        let attributes: HashMap<String, String> = options
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        builder.connect_attrs(Some(attributes))
    }
}
