pub mod feed_xml_reader;
