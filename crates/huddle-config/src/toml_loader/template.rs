/// Default config file content. Every value is commented out so the
/// built-in defaults apply until the user opts in.
pub fn default_config_toml() -> &'static str {
    r##"# Huddle Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[service]
# http_url = "http://localhost:3000"
# path = ""                      # prefix for HTTP, socket and peer endpoints
# request_timeout_secs = 10      # 1-120

[presence]
# ws_url = "ws://localhost:3000"
# heartbeat_interval_secs = 25   # 5-300
# reconnect_delay_secs = 1       # 1-60
# max_reconnect_delay_secs = 30  # reconnect_delay_secs-600

[peer]
# host = "localhost"
# port = 8848
# path = "/peer"

# [[peer.ice_servers]]
# urls = "turn:turn.example.org:3478"
# username = ""
# credential = ""

[limits]
# max_room_id_len = 10         # 1-10
# max_name_len = 10             # 1-10
"##
}
