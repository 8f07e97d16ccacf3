//! Help text for the query language

/// How to write a query; printed after the usage by `lrep --help`.
pub const QUERY_HELP: &str = r#"HOW TO WRITE A QUERY

KEYS
  A key evaluates to the key's value. Key names are prefixed by '.'

      record   user=John mail=john@doe.com
      query    .user
      result   "John"

EXISTENCE
  A key followed by '?' is true when the record has that key, with or
  without a value.

      record   user=John debug
      query    .debug ?
      result   true

COMPARISON
  '<', '>' and '=' compare two values as numbers.

      record   in=120 out=125
      query    .in < .out
      result   true

  Values are read as literals, so durations compare too:

      record   load=100µs
      query    .load < 35ms
      result   true

MATCHING
  '~' matches a value against a regular expression.

      record   user=johndoe@mail.com
      query    .user ~ /john.*/
      result   true

  Regular expression literals are delimited by '/'. To write a '/' inside
  the regular expression, escape it: '/path\/subpath/'

LOGIC
  Comparisons and matchings combine with 'and', 'or' and 'not' (any case).

      record   user=johndoe@mail.com age=20
      query    .user ~ /john.*/ and .age < 40
      result   true

  'AND' has priority over 'OR':
      '.a OR .b AND .c' is the same as '.a OR ( .b AND .c )'

LITERALS
  .name        a key
  /regexp/     a regular expression
  42  -7       a number
  3.14         a decimal
  35ms  1h30m  a duration (units ns, us, µs, ms, s, m, h)

SPACE DELIMITER
  logfmt keys can be anything but ' ', therefore key names *must* be
  delimited by a space.
      '(.a AND .b)'   is not valid: '.b)' is a single key name.
      '(.a AND .b )'  is valid.
"#;
